/*!
# DiscRip: Sidecar Artifacts
*/

use crate::{
	AudioToc,
	DigestSummary,
	DiscProfile,
	GIB,
	RipError,
	Verification,
};
use std::{
	fmt::Write as _,
	fs::File,
	io::Write,
	path::Path,
};
use utc2k::FmtUtc2k;



/// # PCM WAV Header Length.
const WAV_HEADER_LEN: u64 = 44;

/// # RF64 Header Length.
///
/// The RF64 form carries an extra `ds64` chunk (8 + 28 bytes) holding the
/// 64-bit sizes its 32-bit fields cannot.
const RF64_HEADER_LEN: u64 = 80;

/// # Combined Audio Byte Rate.
///
/// 44.1 kHz stereo 16-bit works out to 176,400 bytes per second; channel
/// counts other than two derive their sample rate from this so playback
/// duration stays put.
const AUDIO_BYTE_RATE: u32 = 176_400;



/// # Write the BCA Pair.
///
/// The raw bytes land in `<name>.bca`, and a human-readable rendering
/// (each bit drawn as `|` for one or `_` for zero, eight per byte) in
/// `<name>.bca.txt`.
///
/// ## Errors
///
/// Returns an error if either file cannot be written.
pub fn write_bca(dir: &Path, name: &str, data: &[u8]) -> Result<(), RipError> {
	let path = dir.join(format!("{name}.bca"));
	std::fs::write(&path, data)
		.map_err(|_| RipError::Write(path.to_string_lossy().into_owned()))?;

	let path = dir.join(format!("{name}.bca.txt"));
	std::fs::write(&path, bca_bits(data))
		.map_err(|_| RipError::Write(path.to_string_lossy().into_owned()))
}

#[must_use]
/// # Render BCA Bits.
pub fn bca_bits(data: &[u8]) -> String {
	let mut out = String::with_capacity(data.len() * 8);
	for byte in data {
		for shift in (0..8).rev() {
			out.push(if byte >> shift & 1 == 1 { '|' } else { '_' });
		}
	}
	out
}



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # WAV Header Form.
///
/// A 44-byte PCM header cannot be widened into an RF64 header after the
/// fact, so the form is decided up front from the predicted data size and
/// merely re-rendered with real numbers during finalization.
pub struct WavForm {
	/// # RF64?
	rf64: bool,

	/// # Channels.
	channels: u16,
}

impl WavForm {
	#[must_use]
	/// # Pick a Form.
	///
	/// Data of four gibibytes or more overflows the 32-bit RIFF fields
	/// and needs RF64.
	pub const fn predict(data_size: u64, channels: u16) -> Self {
		Self {
			rf64: data_size >= 4 * GIB,
			channels,
		}
	}

	#[must_use]
	/// # RF64?
	pub const fn is_rf64(self) -> bool { self.rf64 }

	#[must_use]
	/// # Header Length.
	pub const fn header_len(self) -> u64 {
		if self.rf64 { RF64_HEADER_LEN }
		else { WAV_HEADER_LEN }
	}

	#[must_use]
	/// # Render the Header.
	///
	/// Sixteen-bit PCM throughout; the sample rate derives from the
	/// channel count to preserve the 176,400-byte/second CDDA rate.
	pub fn render(self, data_size: u64) -> Vec<u8> {
		let channels = self.channels;
		let sample_rate = AUDIO_BYTE_RATE / 2 / u32::from(channels);
		let byte_rate = sample_rate * u32::from(channels) * 2;
		let block_align = channels * 2;

		let mut out = Vec::with_capacity(self.header_len() as usize);
		if self.rf64 {
			out.extend_from_slice(b"RF64");
			out.extend_from_slice(&u32::MAX.to_le_bytes());
			out.extend_from_slice(b"WAVE");

			// The ds64 chunk carries the real sizes.
			out.extend_from_slice(b"ds64");
			out.extend_from_slice(&28_u32.to_le_bytes());
			out.extend_from_slice(&(RF64_HEADER_LEN - 8 + data_size).to_le_bytes());
			out.extend_from_slice(&data_size.to_le_bytes());
			out.extend_from_slice(&(data_size / u64::from(block_align)).to_le_bytes());
		}
		else {
			out.extend_from_slice(b"RIFF");
			out.extend_from_slice(&(36 + data_size as u32).to_le_bytes());
			out.extend_from_slice(b"WAVE");
		}

		out.extend_from_slice(b"fmt ");
		out.extend_from_slice(&16_u32.to_le_bytes());
		out.extend_from_slice(&1_u16.to_le_bytes()); // PCM.
		out.extend_from_slice(&channels.to_le_bytes());
		out.extend_from_slice(&sample_rate.to_le_bytes());
		out.extend_from_slice(&byte_rate.to_le_bytes());
		out.extend_from_slice(&block_align.to_le_bytes());
		out.extend_from_slice(&16_u16.to_le_bytes()); // Bits per sample.

		out.extend_from_slice(b"data");
		if self.rf64 { out.extend_from_slice(&u32::MAX.to_le_bytes()); }
		else { out.extend_from_slice(&(data_size as u32).to_le_bytes()); }

		out
	}

	/// # Write the Header Into a File.
	///
	/// ## Errors
	///
	/// Returns an error if the write fails.
	pub fn write_to(self, file: &mut File, data_size: u64) -> Result<(), RipError> {
		file.write_all(&self.render(data_size))
			.map_err(|e| RipError::Write(e.to_string()))
	}
}



/// # Write the CUE Sheet.
///
/// CRLF throughout: optional `PERFORMER`/`TITLE`/`CATALOG` header lines,
/// the `FILE` reference, then one `TRACK`/`INDEX` group per TOC entry,
/// with index times shifted back past the 150-frame lead-in. Without a TOC the sheet degrades to a single track starting
/// at zero.
///
/// ## Errors
///
/// Returns an error if the file cannot be written.
pub fn write_cue(
	dir: &Path,
	name: &str,
	audio_file: &str,
	is_wave: bool,
	toc: Option<&AudioToc>,
) -> Result<(), RipError> {
	let mut out = String::new();

	if let Some(toc) = toc {
		if let Some(v) = toc.album_performer.as_deref() {
			let _res = write!(out, "PERFORMER \"{v}\"\r\n");
		}
		if let Some(v) = toc.album_title.as_deref() {
			let _res = write!(out, "TITLE \"{v}\"\r\n");
		}
		if let Some(v) = toc.mcn.as_deref() {
			let _res = write!(out, "CATALOG {v}\r\n");
		}
	}

	let _res = write!(
		out,
		"FILE \"{audio_file}\" {}\r\n",
		if is_wave { "WAVE" } else { "BINARY" },
	);

	if let Some(toc) = toc.filter(|t| ! t.tracks.is_empty()) {
		for t in &toc.tracks {
			let _res = write!(out, "  TRACK {:02} AUDIO\r\n", t.number);
			if let Some(v) = t.title.as_deref() {
				let _res = write!(out, "    TITLE \"{v}\"\r\n");
			}
			if let Some(v) = t.performer.as_deref() {
				let _res = write!(out, "    PERFORMER \"{v}\"\r\n");
			}
			if let Some(v) = t.isrc.as_deref() {
				let _res = write!(out, "    ISRC {v}\r\n");
			}
			let _res = write!(out, "    INDEX 01 {}\r\n", t.start.minus_leadin());
		}
	}
	else {
		out.push_str("  TRACK 01 AUDIO\r\n    INDEX 01 00:00:00\r\n");
	}

	let path = dir.join(format!("{name}.cue"));
	std::fs::write(&path, out)
		.map_err(|_| RipError::Write(path.to_string_lossy().into_owned()))
}



/// # Write the Dump-Info Report.
///
/// The human-readable receipt for a dump: program version, file and
/// internal names, digests, verification status, duration, and a
/// timestamp. CRLF line endings, like the CUE.
///
/// ## Errors
///
/// Returns an error if the file cannot be written.
pub fn write_dump_info(
	dir: &Path,
	name: &str,
	profile: &DiscProfile,
	digests: &DigestSummary,
	verification: &Verification,
	seconds: u64,
) -> Result<(), RipError> {
	let mut out = format!(
		"--File Generated by DiscRip v{}--\r\n\r\nFilename: {name}\r\nInternal Name: {}\r\n",
		env!("CARGO_PKG_VERSION"),
		profile.internal_title(),
	);

	if let (Some(md5), Some(sha1)) = (digests.md5.as_deref(), digests.sha1.as_deref()) {
		let _res = write!(out, "MD5: {md5}\r\nSHA-1: {sha1}\r\n");
	}

	let _res = write!(
		out,
		"CRC32: {:08X}\r\nVerified: {}\r\nDuration: {} min. {} sec\r\nDumped at: {}.\r\n",
		digests.crc32,
		if verification.is_verified() { "Yes" } else { "No" },
		seconds / 60,
		seconds % 60,
		FmtUtc2k::now(),
	);

	if digests.md5.is_none() {
		out.push_str("\r\n-- DO NOT USE THIS FOR REDUMP SUBMISSIONS, ENABLE CHECKSUM CALCULATIONS FOR THAT!");
	}

	let path = dir.join(format!("{name}-dumpinfo.txt"));
	std::fs::write(&path, out)
		.map_err(|_| RipError::Write(path.to_string_lossy().into_owned()))
}



#[cfg(test)]
mod test {
	use super::*;
	use crate::{
		Msf,
		TocEntry,
	};

	#[test]
	fn t_bca_bits() {
		assert_eq!(bca_bits(&[0b1010_0001]), "|_|____|");
		assert_eq!(bca_bits(&[0, 0xFF]), "________||||||||");
		assert_eq!(bca_bits(&[0; 64]).len(), 512);
	}

	#[test]
	fn t_wav_header() {
		let form = WavForm::predict(1000, 2);
		assert!(! form.is_rf64(), "Small data wants plain WAV.");
		assert_eq!(form.header_len(), 44);

		let raw = form.render(1000);
		assert_eq!(raw.len(), 44);
		assert_eq!(&raw[..4], b"RIFF");
		assert_eq!(&raw[8..12], b"WAVE");
		assert_eq!(u32::from_le_bytes([raw[4], raw[5], raw[6], raw[7]]), 1036);
		assert_eq!(u32::from_le_bytes([raw[40], raw[41], raw[42], raw[43]]), 1000);
	}

	#[test]
	fn t_wav_header_hound() {
		// The emitted header must satisfy an actual WAV parser.
		let form = WavForm::predict(8, 2);
		let mut raw = form.render(8);
		raw.extend_from_slice(&[0; 8]);

		let reader = hound::WavReader::new(std::io::Cursor::new(raw))
			.expect("Header unreadable.");
		let spec = reader.spec();
		assert_eq!(spec.channels, 2);
		assert_eq!(spec.sample_rate, 44_100);
		assert_eq!(spec.bits_per_sample, 16);
		assert_eq!(spec.sample_format, hound::SampleFormat::Int);
	}

	#[test]
	fn t_wav_header_mono() {
		// Other channel counts trade sample rate for duration.
		let raw = WavForm::predict(0, 1).render(0);
		assert_eq!(u16::from_le_bytes([raw[22], raw[23]]), 1);
		assert_eq!(u32::from_le_bytes([raw[24], raw[25], raw[26], raw[27]]), 88_200);
		assert_eq!(u32::from_le_bytes([raw[28], raw[29], raw[30], raw[31]]), 176_400);
	}

	#[test]
	fn t_rf64_header() {
		let big = 5 * GIB;
		let form = WavForm::predict(big, 2);
		assert!(form.is_rf64(), "Five gibibytes needs RF64.");

		let raw = form.render(big);
		assert_eq!(raw.len(), 80);
		assert_eq!(&raw[..4], b"RF64");
		assert_eq!(u32::from_le_bytes([raw[4], raw[5], raw[6], raw[7]]), u32::MAX);
		assert_eq!(&raw[8..12], b"WAVE");
		assert_eq!(&raw[12..16], b"ds64");

		// The 64-bit sizes live in the ds64 chunk.
		let riff_size = u64::from_le_bytes(raw[20..28].try_into().expect("Slice failed."));
		let data_size = u64::from_le_bytes(raw[28..36].try_into().expect("Slice failed."));
		let samples = u64::from_le_bytes(raw[36..44].try_into().expect("Slice failed."));
		assert_eq!(riff_size, 72 + big);
		assert_eq!(data_size, big);
		assert_eq!(samples, big / 4);

		// And the 32-bit data length is the overflow sentinel.
		assert_eq!(&raw[72..76], b"data");
		assert_eq!(u32::from_le_bytes([raw[76], raw[77], raw[78], raw[79]]), u32::MAX);
	}

	#[test]
	fn t_cue() {
		let dir = tempfile::tempdir().expect("Tempdir failed.");
		let toc = AudioToc {
			first: 1,
			last: 2,
			tracks: vec![
				TocEntry {
					number: 1,
					start: Msf::new(0, 2, 0).expect("MSF failed."),
					title: Some("One".to_owned()),
					isrc: Some("USRC17607839".to_owned()),
					..TocEntry::default()
				},
				TocEntry {
					number: 2,
					start: Msf::new(4, 41, 20).expect("MSF failed."),
					..TocEntry::default()
				},
			],
			leadout: Msf::new(10, 0, 0).expect("MSF failed."),
			mcn: Some("1234567890128".to_owned()),
			album_title: Some("DEMO".to_owned()),
			album_performer: Some("ARTIST".to_owned()),
		};

		write_cue(dir.path(), "ARTIST_-_DEMO", "ARTIST_-_DEMO.wav", true, Some(&toc))
			.expect("CUE failed.");
		let raw = std::fs::read_to_string(dir.path().join("ARTIST_-_DEMO.cue"))
			.expect("Read failed.");

		assert_eq!(
			raw,
			"PERFORMER \"ARTIST\"\r\n\
			TITLE \"DEMO\"\r\n\
			CATALOG 1234567890128\r\n\
			FILE \"ARTIST_-_DEMO.wav\" WAVE\r\n\
			\x20 TRACK 01 AUDIO\r\n\
			\x20   TITLE \"One\"\r\n\
			\x20   ISRC USRC17607839\r\n\
			\x20   INDEX 01 00:00:00\r\n\
			\x20 TRACK 02 AUDIO\r\n\
			\x20   INDEX 01 04:39:20\r\n",
		);
	}

	#[test]
	fn t_cue_no_toc() {
		let dir = tempfile::tempdir().expect("Tempdir failed.");
		write_cue(dir.path(), "disc0", "disc0.bin", false, None)
			.expect("CUE failed.");
		let raw = std::fs::read_to_string(dir.path().join("disc0.cue"))
			.expect("Read failed.");
		assert_eq!(
			raw,
			"FILE \"disc0.bin\" BINARY\r\n  TRACK 01 AUDIO\r\n    INDEX 01 00:00:00\r\n",
		);
	}
}
