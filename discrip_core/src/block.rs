/*!
# DiscRip: Read Blocks
*/

use crate::BLOCK_COUNT;



#[derive(Debug)]
/// # Read Block.
///
/// One reusable acquisition buffer. A fixed set of these is allocated at
/// session start and cycled `free queue → rip loop → writer → free queue`
/// for the duration; movement is by value, never copy.
///
/// The capacity is fixed at construction; `len` marks the effective bytes
/// for the (possibly short) final block of a rip.
pub(crate) struct ReadBlock {
	/// # Buffer.
	data: Vec<u8>,

	/// # Effective Bytes.
	len: usize,

	/// # First Sector.
	sector_start: u32,

	/// # Sector Count.
	sector_count: u32,
}

impl ReadBlock {
	/// # New Instance.
	pub(crate) fn new(capacity: usize) -> Self {
		Self {
			data: vec![0; capacity],
			len: capacity,
			sector_start: 0,
			sector_count: 0,
		}
	}

	/// # Allocate the Session Pool.
	pub(crate) fn pool(capacity: usize) -> Vec<Self> {
		(0..BLOCK_COUNT).map(|_| Self::new(capacity)).collect()
	}

	/// # Reframe for the Next Read.
	///
	/// Set the sector span and clamp the effective length accordingly.
	pub(crate) fn reframe(&mut self, sector_start: u32, sector_count: u32, sector_size: u32) {
		self.sector_start = sector_start;
		self.sector_count = sector_count;
		self.len = (sector_count as usize) * (sector_size as usize);
	}

	/// # Effective Bytes.
	pub(crate) fn bytes(&self) -> &[u8] { &self.data[..self.len] }

	/// # Effective Bytes (Mutable).
	pub(crate) fn bytes_mut(&mut self) -> &mut [u8] { &mut self.data[..self.len] }

	/// # First Sector.
	pub(crate) const fn sector_start(&self) -> u32 { self.sector_start }

	/// # Sector Count.
	pub(crate) const fn sector_count(&self) -> u32 { self.sector_count }
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_block_pool() {
		let pool = ReadBlock::pool(2048 * 4);
		assert_eq!(pool.len(), BLOCK_COUNT, "Wrong pool size.");
		assert!(pool.iter().all(|b| b.bytes().len() == 2048 * 4), "Wrong block capacity.");
	}

	#[test]
	fn t_block_reframe() {
		let mut block = ReadBlock::new(2048 * 4);
		block.reframe(100, 2, 2048);
		assert_eq!(block.sector_start(), 100);
		assert_eq!(block.sector_count(), 2);
		assert_eq!(block.bytes().len(), 4096);
	}
}
