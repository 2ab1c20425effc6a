/*!
# DiscRip: CD-TEXT
*/

use std::collections::BTreeMap;
use trimothy::TrimSlice;



/// # Pack Size.
///
/// CD-TEXT arrives as a stream of fixed 18-byte packets: a 4-byte header,
/// 12 text bytes, and a 2-byte CRC (ignored here).
const PACK_SIZE: usize = 18;

/// # Pack Type: Title.
const PACK_TITLE: u8 = 0x80;

/// # Pack Type: Performer.
const PACK_PERFORMER: u8 = 0x81;



#[derive(Debug, Clone, Default)]
/// # Parsed CD-TEXT.
///
/// Titles and performers, indexed by track number. Track `0` holds the
/// album-level values.
pub struct CdText {
	/// # Titles by Track.
	titles: BTreeMap<u8, String>,

	/// # Performers by Track.
	performers: BTreeMap<u8, String>,
}

impl CdText {
	#[must_use]
	/// # Parse a Raw Pack Stream.
	///
	/// Only Block 0 (English) is considered. Within a pack's twelve text
	/// bytes, a NUL terminates the current field and bumps the running
	/// track number, so a single pack may finish one track's field and
	/// start the next.
	pub fn parse(raw: &[u8]) -> Self {
		let mut titles = Accumulator::default();
		let mut performers = Accumulator::default();

		for pack in raw.chunks_exact(PACK_SIZE) {
			// Non-English blocks and unknown pack types are skipped whole.
			let block = (pack[3] >> 4) & 0b0111;
			if block != 0 { continue; }

			let acc = match pack[0] {
				PACK_TITLE => &mut titles,
				PACK_PERFORMER => &mut performers,
				_ => continue,
			};

			acc.sync_track(pack[1] & 0b0111_1111);
			for &b in &pack[4..16] { acc.push(b); }
		}

		Self {
			titles: titles.finish(),
			performers: performers.finish(),
		}
	}

	#[must_use]
	/// # Track Title.
	///
	/// Track `0` is the album title.
	pub fn title(&self, track: u8) -> Option<&str> {
		self.titles.get(&track).map(String::as_str)
	}

	#[must_use]
	/// # Track Performer.
	///
	/// Track `0` is the album performer.
	pub fn performer(&self, track: u8) -> Option<&str> {
		self.performers.get(&track).map(String::as_str)
	}

	#[must_use]
	/// # Empty?
	pub fn is_empty(&self) -> bool {
		self.titles.is_empty() && self.performers.is_empty()
	}
}



#[derive(Debug, Default)]
/// # Field Accumulator.
///
/// Collects the text bytes of one pack type across packet boundaries,
/// committing a field each time a NUL terminator arrives.
struct Accumulator {
	/// # Completed Fields.
	done: BTreeMap<u8, String>,

	/// # Current Track Number.
	track: u8,

	/// # Partial Field Bytes.
	pending: Vec<u8>,
}

impl Accumulator {
	/// # Resync the Track Counter.
	///
	/// Each pack header names the track its first character belongs to.
	/// Continuation packs (arriving mid-field) keep the running number;
	/// otherwise the header wins, covering gaps in the sequence.
	fn sync_track(&mut self, track: u8) {
		if self.pending.is_empty() { self.track = track; }
	}

	/// # Push One Text Byte.
	fn push(&mut self, b: u8) {
		if b == 0 { self.commit(); }
		else { self.pending.push(b); }
	}

	/// # Commit the Pending Field.
	fn commit(&mut self) {
		let raw = self.pending.trim();
		if ! raw.is_empty() {
			let text = String::from_utf8_lossy(raw).into_owned();
			self.done.insert(self.track, text);
		}
		self.pending.truncate(0);
		self.track += 1;
	}

	/// # Finish Up.
	///
	/// Commit any trailing unterminated field and return the collection.
	fn finish(mut self) -> BTreeMap<u8, String> {
		if ! self.pending.is_empty() { self.commit(); }
		self.done
	}
}
