/*!
# DiscRip: Digest Pipeline
*/

use crate::DATEL_KEY_BYTES;
use md5::{
	Digest,
	Md5,
};
use sha1::Sha1;
use std::fmt::Write;



#[derive(Debug, Clone)]
/// # Digest Pipeline.
///
/// Every acquired block flows through here before its buffer is reused.
/// CRC32 is always maintained; MD5 and SHA-1 ride along when requested.
/// Updates happen in the rip loop, in LBA order, before the block
/// reaches the writer, so the digests are deterministic whatever the
/// I/O timing.
///
/// The CRC32 of the first mebibyte is snapshotted separately: it is the
/// identification key for Datel discs, whose deliberate bad sectors make
/// full-image checksums useless mid-rip.
pub struct DigestPipeline {
	/// # Rolling CRC32.
	crc: crc32fast::Hasher,

	/// # Optional MD5 + SHA-1.
	full: Option<(Md5, Sha1)>,

	/// # First-MiB CRC32 Snapshot.
	crc100000: Option<u32>,

	/// # Bytes Digested.
	len: u64,
}

impl DigestPipeline {
	#[must_use]
	/// # New.
	pub fn new(checksums: bool) -> Self {
		Self {
			crc: crc32fast::Hasher::new(),
			full: checksums.then(|| (Md5::new(), Sha1::new())),
			crc100000: None,
			len: 0,
		}
	}

	/// # Digest One Block.
	pub fn update(&mut self, data: &[u8]) {
		self.crc.update(data);
		if let Some((md5, sha)) = self.full.as_mut() {
			md5.update(data);
			sha.update(data);
		}

		// The snapshot only fires when a block lands exactly on the first
		// mebibyte; misaligned block sizes simply never produce one.
		self.len += data.len() as u64;
		if self.crc100000.is_none() && self.len == DATEL_KEY_BYTES {
			self.crc100000.replace(self.crc.clone().finalize());
		}
	}

	#[must_use]
	/// # First-MiB CRC32.
	pub const fn crc100000(&self) -> Option<u32> { self.crc100000 }

	#[must_use]
	/// # Bytes Digested.
	pub const fn len(&self) -> u64 { self.len }

	#[must_use]
	/// # Empty?
	pub const fn is_empty(&self) -> bool { self.len == 0 }

	#[must_use]
	/// # Finalize.
	pub fn finish(self) -> DigestSummary {
		let (md5, sha1) = self.full.map_or((None, None), |(md5, sha)| (
			Some(hex(&md5.finalize())),
			Some(hex(&sha.finalize())),
		));

		DigestSummary {
			crc32: self.crc.finalize(),
			crc100000: self.crc100000,
			md5,
			sha1,
			bytes: self.len,
		}
	}
}



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Final Digests.
pub struct DigestSummary {
	/// # CRC32 of the Whole Image.
	pub crc32: u32,

	/// # CRC32 of the First MiB.
	pub crc100000: Option<u32>,

	/// # MD5, Lowercase Hex.
	pub md5: Option<String>,

	/// # SHA-1, Lowercase Hex.
	pub sha1: Option<String>,

	/// # Total Bytes.
	pub bytes: u64,
}



/// # Lowercase Hex.
fn hex(raw: &[u8]) -> String {
	let mut out = String::with_capacity(raw.len() * 2);
	for b in raw {
		// Writing to a String cannot fail.
		let _res = write!(&mut out, "{b:02x}");
	}
	out
}
