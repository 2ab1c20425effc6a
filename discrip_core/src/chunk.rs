/*!
# DiscRip: Chunk Planning
*/

use crate::{
	DiscKind,
	DiscProfile,
	DualLayer,
	GIB,
	NGC_DISC_SIZE,
	RipOptions,
};



/// # FAT File-Size Bits.
///
/// Filesystems reporting 33 or fewer file-size bits (i.e. FAT32) cap
/// regular files just shy of 4 GiB.
const FAT_FILESIZE_BITS: u32 = 33;



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Chunk Plan.
///
/// The output-file shape for one rip, computed once up front: either a
/// single file, or a `.part0`/`.part1`/… series rolled over whenever the
/// write offset passes a multiple of the chunk size.
pub struct ChunkPlan {
	/// # Bytes Per Part.
	chunk_bytes: u64,

	/// # Total Image Bytes.
	total_bytes: u64,
}

impl ChunkPlan {
	#[must_use]
	/// # New.
	///
	/// `fs_size_bits` is the destination's `PC_FILESIZEBITS` report, if
	/// known; at most 33 bits triggers FAT-safe capping. `max_read_size`
	/// is the session's block size, kept clear of the boundary so a full
	/// block always fits.
	pub fn new(
		profile: &DiscProfile,
		opts: &RipOptions,
		max_read_size: u32,
		fs_size_bits: Option<u32>,
	) -> Self {
		let total_bytes = profile.total_bytes();
		let max_read_size = u64::from(max_read_size);

		let mut chunk_bytes = opts.chunk_size().bytes().unwrap_or_else(||
			// `Max` means one file if the filesystem can take it, else the
			// biggest FAT-safe part possible.
			if fs_size_bits.is_some_and(|bits| bits <= FAT_FILESIZE_BITS) {
				4 * GIB - max_read_size - 1
			}
			else { total_bytes + max_read_size }
		);

		// GameCube-sized images are never split, whatever the option says.
		if matches!(profile.kind(), DiscKind::GameCube | DiscKind::Datel)
			|| (profile.kind() == DiscKind::Wii && opts.dual_layer() == DualLayer::Mini)
		{
			chunk_bytes = u64::from(NGC_DISC_SIZE) * 2048;
		}

		// Audio stays whole too, so a single CUE can reference it.
		if profile.is_audio() {
			chunk_bytes = total_bytes + max_read_size;
		}

		Self { chunk_bytes, total_bytes }
	}

	#[must_use]
	/// # Bytes Per Part.
	pub const fn chunk_bytes(&self) -> u64 { self.chunk_bytes }

	#[must_use]
	/// # Multiple Parts?
	pub const fn is_multi(&self) -> bool { self.chunk_bytes < self.total_bytes }

	#[must_use]
	/// # Rollover?
	///
	/// `true` when the write offset has passed the end of chunk
	/// `chunk_idx` (counted from one) and the next part file is due.
	pub const fn boundary(&self, offset: u64, chunk_idx: u32) -> bool {
		offset > self.chunk_bytes * chunk_idx as u64
	}

	#[must_use]
	/// # Output File Name.
	///
	/// Single-file plans are `<name><ext>`; multi-part plans count up from
	/// `<name>.part0<ext>`.
	pub fn file_name(&self, name: &str, ext: &str, part: u32) -> String {
		if self.is_multi() { format!("{name}.part{part}{ext}") }
		else { format!("{name}{ext}") }
	}
}
