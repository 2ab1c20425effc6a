/*!
# DiscRip: Audio Table of Contents
*/

use crate::{
	CD_FPS,
	CD_LEADIN,
};
use std::fmt;



/// # Audio Track Control: Data Bit.
///
/// Bit 2 of the Q-subchannel control nibble distinguishes data tracks
/// from audio tracks.
const CONTROL_DATA: u8 = 0b0100;



#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Ord, PartialOrd)]
/// # MSF Timestamp.
///
/// Disc positions are addressed in "minute:second:frame" form, 75 frames
/// to the second, 60 seconds to the minute. Values here are plain binary,
/// as reported by the TOC query surface.
pub struct Msf {
	/// # Minutes.
	m: u8,

	/// # Seconds.
	s: u8,

	/// # Frames.
	f: u8,
}

impl fmt::Display for Msf {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:02}:{:02}:{:02}", self.m, self.s, self.f)
	}
}

impl Msf {
	#[must_use]
	/// # New.
	///
	/// Returns `None` if the seconds or frames are out of range.
	pub const fn new(m: u8, s: u8, f: u8) -> Option<Self> {
		if s < 60 && (f as u32) < CD_FPS { Some(Self { m, s, f }) }
		else { None }
	}

	#[must_use]
	/// # From an Absolute Frame Count.
	///
	/// Returns `None` if the position runs past 99 minutes.
	pub const fn from_frames(total: u32) -> Option<Self> {
		let m = total / (60 * CD_FPS);
		if m > 99 { return None; }
		let rest = total % (60 * CD_FPS);
		Some(Self {
			m: m as u8,
			s: (rest / CD_FPS) as u8,
			f: (rest % CD_FPS) as u8,
		})
	}

	#[must_use]
	/// # Total Frames.
	pub const fn total_frames(self) -> u32 {
		(self.m as u32 * 60 + self.s as u32) * CD_FPS + self.f as u32
	}

	#[must_use]
	/// # Relative File Position.
	///
	/// TOC addresses include the 150-frame lead-in; byte offsets within the
	/// dumped file do not. This floors at zero rather than wrapping.
	pub const fn minus_leadin(self) -> Self {
		let total = self.total_frames();
		let total =
			if total >= CD_LEADIN { total - CD_LEADIN }
			else { 0 };

		// The subtraction cannot push the position past 99 minutes, so this
		// always holds a value.
		match Self::from_frames(total) {
			Some(msf) => msf,
			None => Self { m: 0, s: 0, f: 0 },
		}
	}
}



#[derive(Debug, Clone, Default)]
/// # One TOC Track.
pub struct TocEntry {
	/// # Track Number (1..=99).
	pub number: u8,

	/// # Q-Subchannel Control Bits.
	pub control: u8,

	/// # Absolute Start Position.
	pub start: Msf,

	/// # International Standard Recording Code.
	pub isrc: Option<String>,

	/// # CD-TEXT Title.
	pub title: Option<String>,

	/// # CD-TEXT Performer.
	pub performer: Option<String>,
}

impl TocEntry {
	#[must_use]
	/// # Audio Track?
	pub const fn is_audio(&self) -> bool { self.control & CONTROL_DATA == 0 }
}



#[derive(Debug, Clone, Default)]
/// # Audio Table of Contents.
///
/// The parsed TOC of an inserted Audio CD, optionally enriched with
/// CD-TEXT, MCN, and per-track ISRC data pulled from the subchannel.
pub struct AudioToc {
	/// # First Track Number.
	pub first: u8,

	/// # Last Track Number.
	pub last: u8,

	/// # Tracks, in TOC Order.
	pub tracks: Vec<TocEntry>,

	/// # Lead-Out Position.
	pub leadout: Msf,

	/// # Media Catalog Number (13 Digits).
	pub mcn: Option<String>,

	/// # CD-TEXT Album Title.
	pub album_title: Option<String>,

	/// # CD-TEXT Album Performer.
	pub album_performer: Option<String>,
}

impl AudioToc {
	#[must_use]
	/// # Audio Disc?
	///
	/// Returns `true` if the first track is an audio track.
	pub fn is_audio(&self) -> bool {
		self.tracks.first().is_some_and(TocEntry::is_audio)
	}

	#[must_use]
	/// # Dumpable Sectors.
	///
	/// The lead-out frame minus the two-second lead-in. Positions shorter
	/// than the lead-in are returned as-is.
	pub const fn end_lba(&self) -> u32 {
		let frames = self.leadout.total_frames();
		if frames >= CD_LEADIN { frames - CD_LEADIN }
		else { frames }
	}

	#[must_use]
	/// # Album Label.
	///
	/// Format the CD-TEXT performer/title pair into a display name,
	/// `"{performer} - {title}"`, falling back to whichever single field is
	/// present.
	pub fn album_label(&self) -> Option<String> {
		match (self.album_performer.as_deref(), self.album_title.as_deref()) {
			(Some(p), Some(t)) => Some(format!("{p} - {t}")),
			(Some(one), None) | (None, Some(one)) => Some(one.to_owned()),
			(None, None) => None,
		}
	}
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_msf() {
		let msf = Msf::new(2, 30, 74).expect("MSF failed.");
		assert_eq!(msf.total_frames(), (2 * 60 + 30) * 75 + 74);
		assert_eq!(msf.to_string(), "02:30:74");
		assert!(Msf::new(0, 60, 0).is_none(), "Seconds out of range.");
		assert!(Msf::new(0, 0, 75).is_none(), "Frames out of range.");

		// Frame conversions should round-trip.
		let back = Msf::from_frames(msf.total_frames()).expect("From frames failed.");
		assert_eq!(msf, back, "MSF round-trip failed.");
		assert!(Msf::from_frames(100 * 60 * 75).is_none(), "Minute overflow.");
	}

	#[test]
	fn t_msf_leadin() {
		// 00:02:00 absolute is the start of the file.
		let msf = Msf::new(0, 2, 0).expect("MSF failed.");
		assert_eq!(msf.minus_leadin(), Msf::default());

		// Inversion: relative + 150 frames = absolute.
		let msf = Msf::new(3, 12, 41).expect("MSF failed.");
		let rel = msf.minus_leadin();
		assert_eq!(rel.total_frames() + 150, msf.total_frames());

		// Positions inside the lead-in floor at zero.
		let msf = Msf::new(0, 1, 10).expect("MSF failed.");
		assert_eq!(msf.minus_leadin(), Msf::default());
	}

	#[test]
	fn t_toc_control() {
		let mut entry = TocEntry { control: 0b0000, ..TocEntry::default() };
		assert!(entry.is_audio(), "Control 0 is audio.");
		entry.control = 0b0100;
		assert!(! entry.is_audio(), "Bit 2 marks a data track.");
	}

	#[test]
	fn t_toc_end_lba() {
		let toc = AudioToc {
			leadout: Msf::new(62, 44, 30).expect("MSF failed."),
			..AudioToc::default()
		};
		assert_eq!(toc.end_lba(), (62 * 60 + 44) * 75 + 30 - 150);
	}

	#[test]
	fn t_album_label() {
		let mut toc = AudioToc::default();
		assert!(toc.album_label().is_none(), "No label expected.");

		toc.album_title.replace("DEMO".to_owned());
		assert_eq!(toc.album_label().as_deref(), Some("DEMO"));

		toc.album_performer.replace("ARTIST".to_owned());
		assert_eq!(toc.album_label().as_deref(), Some("ARTIST - DEMO"));
	}
}
