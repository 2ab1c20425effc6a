/*!
# DiscRip: Rip Options
*/

use crate::{
	CDDA_BLOCK_SECTORS,
	CDDA_BLOCK_SECTORS_BEST,
	GIB,
	READ_SIZE,
	SECTOR_CDDA,
	SECTOR_ISO,
};



/// # FLAG: Calculate MD5/SHA-1.
const FLAG_CHECKSUMS: u8 = 0b0001;

/// # FLAG: Eject When Done.
const FLAG_EJECT: u8 =     0b0010;

/// # FLAG: Default.
const FLAG_DEFAULT: u8 = FLAG_CHECKSUMS | FLAG_EJECT;

/// # Max WAV Channels.
const MAX_WAV_CHANNELS: u16 = 8;



#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
/// # Wii Dump Size.
pub enum DualLayer {
	#[default]
	/// # Probe the Second Layer.
	Auto,

	/// # 1.4 GB Mini Disc.
	Mini,

	/// # 4.4 GB Single Layer.
	Single,

	/// # 8 GB Dual Layer.
	Dual,
}

impl DualLayer {
	#[must_use]
	/// # As Str.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Auto => "Auto",
			Self::Mini => "1.4GB",
			Self::Single => "4.4GB",
			Self::Dual => "8GB",
		}
	}
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
/// # Output Chunking.
pub enum ChunkSize {
	/// # 1 GiB Parts.
	One,

	/// # 2 GiB Parts.
	Two,

	/// # 3 GiB Parts.
	Three,

	#[default]
	/// # As Big as the Filesystem Allows.
	Max,
}

impl ChunkSize {
	#[must_use]
	/// # Part Size in Bytes.
	///
	/// `None` for [`ChunkSize::Max`], which is resolved against the
	/// destination filesystem instead.
	pub const fn bytes(self) -> Option<u64> {
		match self {
			Self::One => Some(GIB),
			Self::Two => Some(2 * GIB),
			Self::Three => Some(3 * GIB),
			Self::Max => None,
		}
	}

	#[must_use]
	/// # As Str.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::One => "1GB",
			Self::Two => "2GB",
			Self::Three => "3GB",
			Self::Max => "Max",
		}
	}
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
/// # New Device Per Chunk.
pub enum NewDevice {
	#[default]
	/// # Prompt (and Remount) Between Chunks.
	Ask,

	/// # Keep Writing to the Same Device.
	Auto,
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
/// # Audio CD Output Mode.
pub enum AudioOutput {
	#[default]
	/// # Raw 2048-Byte Data Sectors.
	Bin,

	/// # CDDA to WAV.
	Wav,

	/// # CDDA to WAV, Fewer Retries.
	WavFast,

	/// # CDDA to WAV, Smaller Blocks and More Retries.
	WavBest,
}

impl AudioOutput {
	#[must_use]
	/// # Output Extension.
	pub const fn extension(self) -> &'static str {
		match self {
			Self::Bin => ".bin",
			_ => ".wav",
		}
	}

	#[must_use]
	/// # Read Attempts Per Block/Sector.
	pub const fn attempts(self) -> u32 {
		match self {
			Self::Bin | Self::Wav => 6,
			Self::WavFast => 3,
			Self::WavBest => 10,
		}
	}

	#[must_use]
	/// # Retry Failed Blocks Sector-by-Sector?
	pub const fn sector_fallback(self) -> bool { ! matches!(self, Self::WavFast) }

	#[must_use]
	/// # Sector Size.
	///
	/// Raw data mode reads 2048-byte logical sectors; the WAV modes pull
	/// full 2352-byte CDDA frames.
	pub const fn sector_size(self) -> u32 {
		match self {
			Self::Bin => SECTOR_ISO,
			_ => SECTOR_CDDA,
		}
	}

	#[must_use]
	/// # As Str.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Bin => "BIN",
			Self::Wav => "WAV",
			Self::WavFast => "WAV (fast)",
			Self::WavBest => "WAV (best)",
		}
	}
}



#[derive(Debug, Clone, Copy)]
/// # Rip Options.
///
/// The resolved session configuration, set builder-style:
///
/// ```
/// use discrip_core::{ChunkSize, RipOptions};
///
/// let opts = RipOptions::default()
///     .with_chunk_size(ChunkSize::Two)
///     .with_checksums(false);
///
/// assert_eq!(opts.chunk_size(), ChunkSize::Two);
/// assert!(! opts.checksums());
/// ```
pub struct RipOptions {
	/// # Wii Dump Size.
	dual_layer: DualLayer,

	/// # Output Chunking.
	chunk_size: ChunkSize,

	/// # New Device Per Chunk.
	new_device: NewDevice,

	/// # Audio Output Mode.
	audio: AudioOutput,

	/// # WAV Channel Count.
	wav_channels: u16,

	/// # Boolean Options.
	flags: u8,
}

impl Default for RipOptions {
	fn default() -> Self {
		Self {
			dual_layer: DualLayer::Auto,
			chunk_size: ChunkSize::Max,
			new_device: NewDevice::Ask,
			audio: AudioOutput::default(),
			wav_channels: 2,
			flags: FLAG_DEFAULT,
		}
	}
}

impl RipOptions {
	#[must_use]
	/// # With Dump Size.
	///
	/// Choose the Wii image size, or leave it on `Auto` to probe the
	/// second layer. Ignored for non-Wii discs.
	pub const fn with_dual_layer(self, dual_layer: DualLayer) -> Self {
		Self { dual_layer, ..self }
	}

	#[must_use]
	/// # With Chunk Size.
	///
	/// Split the image into parts of roughly this size. The default, `Max`,
	/// produces a single file unless the destination filesystem cannot
	/// hold one.
	pub const fn with_chunk_size(self, chunk_size: ChunkSize) -> Self {
		Self { chunk_size, ..self }
	}

	#[must_use]
	/// # With New-Device Policy.
	///
	/// When `Ask`, the rip pauses at every chunk boundary so a fresh
	/// device can be swapped in; `Auto` just keeps writing.
	pub const fn with_new_device(self, new_device: NewDevice) -> Self {
		Self { new_device, ..self }
	}

	#[must_use]
	/// # With Audio Output Mode.
	pub const fn with_audio(self, audio: AudioOutput) -> Self {
		Self { audio, ..self }
	}

	#[must_use]
	/// # With WAV Channels.
	///
	/// The sample rate is derived to keep the playback duration constant,
	/// so this is purely a container-level choice. Values are capped at
	/// `1..=8`; the default is stereo.
	pub const fn with_wav_channels(self, mut wav_channels: u16) -> Self {
		if wav_channels == 0 { wav_channels = 1; }
		else if wav_channels > MAX_WAV_CHANNELS { wav_channels = MAX_WAV_CHANNELS; }
		Self { wav_channels, ..self }
	}

	#[must_use]
	/// # With Checksums.
	///
	/// Enable or disable the MD5/SHA-1 digests. CRC32 is always computed.
	///
	/// The default is enabled.
	pub const fn with_checksums(self, checksums: bool) -> Self {
		let flags =
			if checksums { self.flags | FLAG_CHECKSUMS }
			else { self.flags & ! FLAG_CHECKSUMS };
		Self { flags, ..self }
	}

	#[must_use]
	/// # With Auto-Eject.
	///
	/// Eject Nintendo discs once their dump completes. Cancelled rips
	/// never eject.
	///
	/// The default is enabled.
	pub const fn with_eject(self, eject: bool) -> Self {
		let flags =
			if eject { self.flags | FLAG_EJECT }
			else { self.flags & ! FLAG_EJECT };
		Self { flags, ..self }
	}
}

impl RipOptions {
	#[must_use]
	/// # Dump Size.
	pub const fn dual_layer(&self) -> DualLayer { self.dual_layer }

	#[must_use]
	/// # Chunk Size.
	pub const fn chunk_size(&self) -> ChunkSize { self.chunk_size }

	#[must_use]
	/// # New-Device Policy.
	pub const fn new_device(&self) -> NewDevice { self.new_device }

	#[must_use]
	/// # Audio Output Mode.
	pub const fn audio(&self) -> AudioOutput { self.audio }

	#[must_use]
	/// # WAV Channels.
	pub const fn wav_channels(&self) -> u16 { self.wav_channels }

	#[must_use]
	/// # Calculate MD5/SHA-1?
	pub const fn checksums(&self) -> bool { FLAG_CHECKSUMS == self.flags & FLAG_CHECKSUMS }

	#[must_use]
	/// # Eject When Done?
	pub const fn auto_eject(&self) -> bool { FLAG_EJECT == self.flags & FLAG_EJECT }

	#[must_use]
	/// # Sectors Per Read Block.
	///
	/// Reads target 1 MiB, except CDDA acquisition, which stays aligned to
	/// whole 2352-byte frames (and shrinks further in `WavBest` mode to
	/// give the retry logic finer granularity).
	pub const fn read_sectors(&self, sector_size: u32) -> u32 {
		if sector_size == SECTOR_CDDA {
			if matches!(self.audio, AudioOutput::WavBest) { CDDA_BLOCK_SECTORS_BEST }
			else { CDDA_BLOCK_SECTORS }
		}
		else {
			let sectors = READ_SIZE / sector_size;
			if sectors == 0 { 1 }
			else { sectors }
		}
	}
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_opt_flags() {
		// Make sure our flags are unique.
		let mut all = vec![FLAG_CHECKSUMS, FLAG_EJECT];
		all.sort_unstable();
		all.dedup();
		assert_eq!(all.len(), 2);
	}

	#[test]
	fn t_opt_checksums() {
		for v in [false, true] {
			let opts = RipOptions::default().with_checksums(v);
			assert_eq!(opts.checksums(), v);
		}
	}

	#[test]
	fn t_opt_eject() {
		for v in [false, true] {
			let opts = RipOptions::default().with_eject(v);
			assert_eq!(opts.auto_eject(), v);
		}
	}

	#[test]
	fn t_opt_wav_channels() {
		for v in [1, 2, 5] {
			let opts = RipOptions::default().with_wav_channels(v);
			assert_eq!(opts.wav_channels(), v);
		}

		// Min.
		let opts = RipOptions::default().with_wav_channels(0);
		assert_eq!(opts.wav_channels(), 1);

		// Max.
		let opts = RipOptions::default().with_wav_channels(100);
		assert_eq!(opts.wav_channels(), MAX_WAV_CHANNELS);
	}

	#[test]
	fn t_opt_read_sectors() {
		let opts = RipOptions::default();

		// ISO blocks hold a full mebibyte.
		assert_eq!(opts.read_sectors(SECTOR_ISO), 512);

		// CDDA blocks stay frame-aligned.
		assert_eq!(opts.read_sectors(SECTOR_CDDA), 96);
		let opts = opts.with_audio(AudioOutput::WavBest);
		assert_eq!(opts.read_sectors(SECTOR_CDDA), 32);
	}

	#[test]
	fn t_opt_audio_policy() {
		for (mode, attempts, fallback, ext) in [
			(AudioOutput::Bin, 6, true, ".bin"),
			(AudioOutput::Wav, 6, true, ".wav"),
			(AudioOutput::WavFast, 3, false, ".wav"),
			(AudioOutput::WavBest, 10, true, ".wav"),
		] {
			assert_eq!(mode.attempts(), attempts);
			assert_eq!(mode.sector_fallback(), fallback);
			assert_eq!(mode.extension(), ext);
		}
	}

	#[test]
	fn t_opt_chunk_bytes() {
		assert_eq!(ChunkSize::One.bytes(), Some(GIB));
		assert_eq!(ChunkSize::Two.bytes(), Some(2 * GIB));
		assert_eq!(ChunkSize::Three.bytes(), Some(3 * GIB));
		assert!(ChunkSize::Max.bytes().is_none(), "Max has no fixed size.");
	}
}
