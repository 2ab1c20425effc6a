/*!
# DiscRip: Disc Profiling
*/

use crate::{
	AUDIO_CD_FALLBACK_SECTORS,
	AudioToc,
	DiscSource,
	NGC_DISC_SIZE,
	NGC_MAGIC,
	RipError,
	RipOptions,
	DualLayer,
	SECTOR_ISO,
	WII_D1_SIZE,
	WII_D5_SIZE,
	WII_D9_SIZE,
	WII_MAGIC,
};
use std::fmt;
use trimothy::TrimSlice;



/// # Max Sanitized Name Length.
const NAME_LEN: usize = 31;

/// # Internal Title Span.
///
/// Bytes `32..544` of the header hold the human-readable title.
const TITLE_RNG: std::ops::Range<usize> = 32..544;



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Disc Kind.
pub enum DiscKind {
	/// # GameCube.
	GameCube,

	/// # Wii.
	Wii,

	/// # Unlicensed Datel Media.
	Datel,

	/// # Anything Else (DVD-Video, Audio CD, …).
	Other,

	/// # Unclassifiable.
	Unknown,
}

impl DiscKind {
	#[must_use]
	/// # Nintendo Medium?
	pub const fn is_nintendo(self) -> bool {
		matches!(self, Self::GameCube | Self::Wii | Self::Datel)
	}
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # User-Forced Disc Type.
///
/// When classification fails, or the user knows better, the type can be
/// forced. The first three variants pin [`DiscKind`] directly; the rest
/// select an `Other` sub-profile.
pub enum ForceKind {
	/// # GameCube.
	GameCube,

	/// # Wii.
	Wii,

	/// # Datel.
	Datel,

	/// # DVD-Video, Single Layer.
	DvdVideoSl,

	/// # DVD-Video, Dual Layer.
	DvdVideoDl,

	/// # Mini DVD.
	MiniDvd,

	/// # Audio CD.
	AudioCd,
}

impl ForceKind {
	#[must_use]
	/// # As Str.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::GameCube => "GameCube",
			Self::Wii => "Wii",
			Self::Datel => "Datel",
			Self::DvdVideoSl => "DVD-Video (single layer)",
			Self::DvdVideoDl => "DVD-Video (dual layer)",
			Self::MiniDvd => "MiniDVD",
			Self::AudioCd => "Audio CD",
		}
	}
}



#[derive(Debug, Clone)]
/// # Disc Profile.
///
/// Everything the session needs to know about the inserted medium,
/// assembled once by [`DiscProfile::detect`] and immutable thereafter.
pub struct DiscProfile {
	/// # Classification.
	kind: DiscKind,

	/// # Forced Sub-Profile (`Other` Kinds Only).
	forced: Option<ForceKind>,

	/// # Sector Size (2048 or 2352).
	sector_size: u32,

	/// # Image Size in Sectors.
	end_lba: u32,

	/// # Sanitized Output Name.
	name: String,

	/// # Internal Title (Header Bytes 32..544).
	internal_title: String,

	/// # Audio TOC, When Present.
	toc: Option<AudioToc>,
}

impl fmt::Display for DiscProfile {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} ({})", self.name, self.type_str())
	}
}

impl DiscProfile {
	/// # Identify the Inserted Medium.
	///
	/// Reads the header sector, classifies the disc by magic word (or TOC
	/// sniffing, or force), resolves the image size, and settles the
	/// output name. `counter` seeds the fallback `disc<n>` name.
	///
	/// ## Errors
	///
	/// Returns [`RipError::UnknownDisc`] when the disc cannot be
	/// classified and no force was supplied; callers are expected to ask
	/// the user and try again.
	pub fn detect(
		src: &mut dyn DiscSource,
		opts: &RipOptions,
		force: Option<ForceKind>,
		counter: u32,
	) -> Result<Self, RipError> {
		// The header read is allowed to fail; an unreadable or blank
		// first sector classifies the same as a zeroed one.
		let mut header = [0_u8; SECTOR_ISO as usize];
		let _res = src.read(&mut header, 0);

		let mut raw_name = String::new();
		let mut internal_title = String::new();
		if header[0] != 0 {
			let id = &header[..6];
			let id = id.iter().position(|&b| b == 0).map_or(id, |p| &id[..p]);
			raw_name = String::from_utf8_lossy(id.trim()).into_owned();

			// A nonzero byte six marks a multi-disc set. The first disc of
			// most sets reports zero, but not all; the suffix is emitted
			// whenever the byte is set.
			if header[6] != 0 {
				raw_name.push_str(&format!("-disc{}", header[6] as u32 + 1));
			}

			let title = &header[TITLE_RNG];
			let title = title.iter().position(|&b| b == 0).map_or(title, |p| &title[..p]);
			internal_title = String::from_utf8_lossy(title.trim()).into_owned();
		}

		// Classification, in order: magic words, user force, TOC sniff.
		let magic_1c = u32::from_be_bytes([header[0x1C], header[0x1D], header[0x1E], header[0x1F]]);
		let magic_18 = u32::from_be_bytes([header[0x18], header[0x19], header[0x1A], header[0x1B]]);
		let mut kind =
			if magic_1c == NGC_MAGIC { DiscKind::GameCube }
			else if magic_18 == WII_MAGIC { DiscKind::Wii }
			else { DiscKind::Unknown };

		let mut forced = None;
		match force {
			// Datel overrides even a successful magic match; the header of
			// an unlicensed disc lies.
			Some(ForceKind::Datel) => { kind = DiscKind::Datel; },
			Some(ForceKind::GameCube) if kind == DiscKind::Unknown => { kind = DiscKind::GameCube; },
			Some(ForceKind::Wii) if kind == DiscKind::Unknown => { kind = DiscKind::Wii; },
			Some(f) if kind == DiscKind::Unknown => {
				kind = DiscKind::Other;
				forced = Some(f);
			},
			_ => {},
		}

		// No magic, no force: an audio TOC is the last tell.
		let mut toc = None;
		if kind == DiscKind::Unknown {
			if let Ok(t) = src.read_toc() {
				if t.is_audio() {
					kind = DiscKind::Other;
					forced = Some(ForceKind::AudioCd);
					toc.replace(t);
				}
			}
		}
		if kind == DiscKind::Unknown { return Err(RipError::UnknownDisc); }

		// A forced Audio CD still wants its TOC for sizing and sidecars.
		if forced == Some(ForceKind::AudioCd) && toc.is_none() {
			toc = src.read_toc().ok();
		}

		let sector_size = match forced {
			Some(ForceKind::AudioCd) => opts.audio().sector_size(),
			_ => SECTOR_ISO,
		};

		let end_lba = match (kind, forced) {
			(DiscKind::GameCube | DiscKind::Datel, _) => NGC_DISC_SIZE,
			(DiscKind::Wii, _) => match opts.dual_layer() {
				DualLayer::Auto => probe_layers(src),
				DualLayer::Mini => WII_D1_SIZE,
				DualLayer::Single => WII_D5_SIZE,
				DualLayer::Dual => WII_D9_SIZE,
			},
			(_, Some(ForceKind::DvdVideoDl)) => WII_D9_SIZE,
			(_, Some(ForceKind::MiniDvd)) => WII_D1_SIZE,
			(_, Some(ForceKind::AudioCd)) => toc.as_ref().map_or(
				AUDIO_CD_FALLBACK_SECTORS,
				AudioToc::end_lba,
			),
			_ => WII_D5_SIZE, // DVD-Video defaults to a single layer.
		};

		// Audio discs prefer their CD-TEXT label over the (useless) header
		// bytes.
		if forced == Some(ForceKind::AudioCd) {
			if let Some(label) = toc.as_ref().and_then(AudioToc::album_label) {
				raw_name = label;
			}
		}

		Ok(Self {
			kind,
			forced,
			sector_size,
			end_lba,
			name: sanitize_name(&raw_name, counter),
			internal_title,
			toc,
		})
	}
}

#[cfg(test)]
impl DiscProfile {
	/// # Hand-Rolled Profile.
	///
	/// Session tests need profiles far smaller than any real medium.
	pub(crate) fn mock(
		kind: DiscKind,
		forced: Option<ForceKind>,
		sector_size: u32,
		end_lba: u32,
		name: &str,
	) -> Self {
		Self {
			kind,
			forced,
			sector_size,
			end_lba,
			name: name.to_owned(),
			internal_title: String::new(),
			toc: None,
		}
	}
}

impl DiscProfile {
	#[must_use]
	/// # Classification.
	pub const fn kind(&self) -> DiscKind { self.kind }

	#[must_use]
	/// # Forced Sub-Profile.
	pub const fn forced(&self) -> Option<ForceKind> { self.forced }

	#[must_use]
	/// # Sector Size.
	pub const fn sector_size(&self) -> u32 { self.sector_size }

	#[must_use]
	/// # Image Size in Sectors.
	pub const fn end_lba(&self) -> u32 { self.end_lba }

	#[must_use]
	/// # Total Image Bytes.
	pub const fn total_bytes(&self) -> u64 {
		self.end_lba as u64 * self.sector_size as u64
	}

	#[must_use]
	/// # Output Name.
	pub fn name(&self) -> &str { &self.name }

	#[must_use]
	/// # Internal Title.
	pub fn internal_title(&self) -> &str { &self.internal_title }

	#[must_use]
	/// # Audio TOC.
	pub const fn toc(&self) -> Option<&AudioToc> { self.toc.as_ref() }

	#[must_use]
	/// # Audio CD?
	pub fn is_audio(&self) -> bool { self.forced == Some(ForceKind::AudioCd) }

	#[must_use]
	/// # Datel?
	pub fn is_datel(&self) -> bool { self.kind == DiscKind::Datel }

	#[must_use]
	/// # Output Extension.
	pub fn extension(&self, opts: &RipOptions) -> &'static str {
		if self.is_audio() { opts.audio().extension() }
		else { ".iso" }
	}

	#[must_use]
	/// # Display Label for the Disc Type.
	pub fn type_str(&self) -> &'static str {
		match self.kind {
			DiscKind::GameCube => "GameCube",
			DiscKind::Datel => "Datel",
			DiscKind::Wii =>
				if self.end_lba == WII_D9_SIZE { "Wii (dual layer)" }
				else { "Wii" },
			DiscKind::Other => match self.forced {
				Some(ForceKind::DvdVideoDl) => "DVD-Video (dual layer)",
				Some(ForceKind::MiniDvd) => "MiniDVD",
				Some(ForceKind::AudioCd) => "Audio CD",
				_ => "DVD-Video",
			},
			DiscKind::Unknown => "Unknown",
		}
	}

	#[must_use]
	/// # WAV Output?
	pub fn is_wav(&self, opts: &RipOptions) -> bool {
		self.is_audio() && self.extension(opts) == ".wav"
	}
}



/// # Probe for a Second Layer.
///
/// Layer detection works by attempting small reads past the candidate
/// layer breaks; a read that lands means the data keeps going. The
/// largest successful probe wins.
fn probe_layers(src: &mut dyn DiscSource) -> u32 {
	let mut buf = [0_u8; 64];
	let mut end = WII_D1_SIZE;
	if src.read(&mut buf, u64::from(WII_D1_SIZE) << 11).is_ok() { end = WII_D5_SIZE; }
	if src.read(&mut buf, u64::from(WII_D5_SIZE) << 11).is_ok() { end = WII_D9_SIZE; }
	end
}

#[must_use]
/// # Sanitize an Output Name.
///
/// Keep `[A-Za-z0-9._-]`, replacing everything else with an underscore,
/// and truncate to thirty-one characters. Names that are empty (or all
/// replacement) fall back to `disc<counter>`.
pub fn sanitize_name(raw: &str, counter: u32) -> String {
	let mut any = false;
	let out: String = raw.chars()
		.take(NAME_LEN)
		.map(|c|
			if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { any = true; c }
			else { '_' }
		)
		.collect();

	if any { out }
	else { format!("disc{counter}") }
}



#[cfg(test)]
mod test {
	use super::*;
	use crate::{
		AudioOutput,
		SourceRead,
	};

	/// # Fake Disc.
	///
	/// Serves a fixed header at offset zero, zeroes up to `readable_bytes`,
	/// and read errors beyond; optionally carries an audio TOC.
	struct FakeDisc {
		header: Vec<u8>,
		readable_bytes: u64,
		toc: Option<AudioToc>,
	}

	impl FakeDisc {
		fn new(header: Vec<u8>, readable_bytes: u64) -> Self {
			Self { header, readable_bytes, toc: None }
		}
	}

	impl SourceRead for FakeDisc {
		fn read(&mut self, dst: &mut [u8], offset: u64) -> Result<(), RipError> {
			if offset + dst.len() as u64 > self.readable_bytes {
				return Err(RipError::DiscRead(-1));
			}
			for v in dst.iter_mut() { *v = 0; }
			if offset == 0 {
				let len = usize::min(dst.len(), self.header.len());
				dst[..len].copy_from_slice(&self.header[..len]);
			}
			Ok(())
		}
	}

	impl DiscSource for FakeDisc {
		fn read_toc(&mut self) -> Result<AudioToc, RipError> {
			self.toc.clone().ok_or(RipError::Toc)
		}
	}

	/// # Header With a Magic Word.
	fn header(id: &[u8], magic_offset: usize, magic: u32) -> Vec<u8> {
		let mut out = vec![0_u8; 2048];
		out[..id.len()].copy_from_slice(id);
		out[magic_offset..magic_offset + 4].copy_from_slice(&magic.to_be_bytes());
		out[32..36].copy_from_slice(b"Game");
		out
	}

	#[test]
	fn t_profile_gamecube() {
		let mut src = FakeDisc::new(header(b"G4BE01", 0x1C, NGC_MAGIC), 2048);
		let opts = RipOptions::default();
		let profile = DiscProfile::detect(&mut src, &opts, None, 0)
			.expect("Detection failed.");

		assert_eq!(profile.kind(), DiscKind::GameCube);
		assert_eq!(profile.name(), "G4BE01");
		assert_eq!(profile.internal_title(), "Game");
		assert_eq!(profile.end_lba(), NGC_DISC_SIZE);
		assert_eq!(profile.sector_size(), 2048);
		assert_eq!(profile.extension(&opts), ".iso");
		assert_eq!(profile.type_str(), "GameCube");
	}

	#[test]
	fn t_profile_multi_disc() {
		let mut raw = header(b"R3ME01", 0x18, WII_MAGIC);
		raw[6] = 1;
		// Enough data to clear the 8 GB probe.
		let mut src = FakeDisc::new(raw, u64::from(WII_D5_SIZE) * 2048 + 64);
		let profile = DiscProfile::detect(&mut src, &RipOptions::default(), None, 0)
			.expect("Detection failed.");

		assert_eq!(profile.kind(), DiscKind::Wii);
		assert_eq!(profile.name(), "R3ME01-disc2");
		assert_eq!(profile.end_lba(), WII_D9_SIZE);
		assert_eq!(profile.type_str(), "Wii (dual layer)");
	}

	#[test]
	fn t_profile_duallayer_probe() {
		let raw = header(b"RVLE01", 0x18, WII_MAGIC);

		// Nothing past the mini size: 1.4 GB.
		let mut src = FakeDisc::new(raw.clone(), 2048);
		let profile = DiscProfile::detect(&mut src, &RipOptions::default(), None, 0)
			.expect("Detection failed.");
		assert_eq!(profile.end_lba(), WII_D1_SIZE);

		// First probe lands, second doesn't: exactly single-layer.
		let mut src = FakeDisc::new(raw.clone(), u64::from(WII_D1_SIZE) * 2048 + 64);
		let profile = DiscProfile::detect(&mut src, &RipOptions::default(), None, 0)
			.expect("Detection failed.");
		assert_eq!(profile.end_lba(), WII_D5_SIZE);
		assert_eq!(profile.type_str(), "Wii");

		// An explicit size skips the probing entirely.
		let mut src = FakeDisc::new(raw, 2048);
		let opts = RipOptions::default().with_dual_layer(DualLayer::Dual);
		let profile = DiscProfile::detect(&mut src, &opts, None, 0)
			.expect("Detection failed.");
		assert_eq!(profile.end_lba(), WII_D9_SIZE);
	}

	#[test]
	fn t_profile_unknown() {
		let mut src = FakeDisc::new(vec![0; 2048], 2048);
		let opts = RipOptions::default();
		assert!(
			matches!(DiscProfile::detect(&mut src, &opts, None, 3), Err(RipError::UnknownDisc)),
			"Blank disc should not classify.",
		);

		// Forcing resolves it; the blank header falls back to the counter
		// name.
		let profile = DiscProfile::detect(&mut src, &opts, Some(ForceKind::DvdVideoSl), 3)
			.expect("Force failed.");
		assert_eq!(profile.kind(), DiscKind::Other);
		assert_eq!(profile.end_lba(), WII_D5_SIZE);
		assert_eq!(profile.name(), "disc3");
		assert_eq!(profile.type_str(), "DVD-Video");

		let profile = DiscProfile::detect(&mut src, &opts, Some(ForceKind::MiniDvd), 3)
			.expect("Force failed.");
		assert_eq!(profile.end_lba(), WII_D1_SIZE);
	}

	#[test]
	fn t_profile_audio() {
		use crate::{
			Msf,
			TocEntry,
		};

		let toc = AudioToc {
			first: 1,
			last: 2,
			tracks: vec![
				TocEntry {
					number: 1,
					start: Msf::new(0, 2, 0).expect("MSF failed."),
					..TocEntry::default()
				},
				TocEntry {
					number: 2,
					start: Msf::new(3, 0, 0).expect("MSF failed."),
					..TocEntry::default()
				},
			],
			leadout: Msf::new(10, 0, 0).expect("MSF failed."),
			album_title: Some("DEMO".to_owned()),
			album_performer: Some("ARTIST".to_owned()),
			..AudioToc::default()
		};

		let mut src = FakeDisc::new(vec![0; 2048], 2048);
		src.toc.replace(toc);

		// Sniffed automatically, named from CD-TEXT.
		let opts = RipOptions::default().with_audio(AudioOutput::Wav);
		let profile = DiscProfile::detect(&mut src, &opts, None, 0)
			.expect("Detection failed.");
		assert_eq!(profile.kind(), DiscKind::Other);
		assert_eq!(profile.forced(), Some(ForceKind::AudioCd));
		assert_eq!(profile.name(), "ARTIST_-_DEMO");
		assert_eq!(profile.sector_size(), 2352);
		assert_eq!(profile.end_lba(), 10 * 60 * 75 - 150);
		assert_eq!(profile.extension(&opts), ".wav");
		assert!(profile.is_wav(&opts), "WAV output expected.");

		// BIN mode reads logical sectors instead.
		let opts = RipOptions::default().with_audio(AudioOutput::Bin);
		let profile = DiscProfile::detect(&mut src, &opts, None, 0)
			.expect("Detection failed.");
		assert_eq!(profile.sector_size(), 2048);
		assert_eq!(profile.extension(&opts), ".bin");
	}

	#[test]
	fn t_profile_audio_no_toc() {
		// A forced Audio CD with an unreadable TOC falls back to the
		// eighty-minute assumption.
		let mut src = FakeDisc::new(vec![0; 2048], 2048);
		let opts = RipOptions::default().with_audio(AudioOutput::Wav);
		let profile = DiscProfile::detect(&mut src, &opts, Some(ForceKind::AudioCd), 0)
			.expect("Force failed.");
		assert_eq!(profile.end_lba(), AUDIO_CD_FALLBACK_SECTORS);
		assert!(profile.toc().is_none(), "Unexpected TOC.");
	}

	#[test]
	fn t_sanitize() {
		assert_eq!(sanitize_name("G4BE01", 0), "G4BE01");
		assert_eq!(sanitize_name("ARTIST - DEMO", 0), "ARTIST_-_DEMO");
		assert_eq!(sanitize_name("", 7), "disc7");
		assert_eq!(sanitize_name("???", 2), "disc2");

		// Sanitizing is idempotent.
		for raw in ["Hello World!", "a/b\\c", "disc0", "R3ME01-disc2"] {
			let once = sanitize_name(raw, 0);
			assert_eq!(sanitize_name(&once, 0), once, "Sanitize not idempotent.");
		}

		// And truncates.
		let long = "a".repeat(64);
		assert_eq!(sanitize_name(&long, 0).len(), 31);
	}
}
