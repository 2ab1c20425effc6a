/*!
# DiscRip: Database Verification
*/

use crate::{
	DigestSummary,
	DiscKind,
	DiscProfile,
	RipError,
};
use std::{
	fmt,
	path::Path,
};



/// # Checksum Database.
///
/// The lookup surface of a loaded Redump/Datel DAT. Loading and parsing
/// databases (and fetching fresh copies) is someone else's job; the
/// engine only ever asks these questions.
pub trait ChecksumDb {
	/// # Any Entries for This Disc Kind?
	fn is_available(&self, kind: DiscKind) -> bool;

	/// # Look Up by CRC32.
	///
	/// Returns the canonical name on a hit.
	fn find_crc32(&self, crc: u32, kind: DiscKind) -> Option<String>;

	/// # Look Up by MD5 (Lowercase Hex).
	///
	/// Returns the canonical name on a hit.
	fn find_md5(&self, md5: &str, kind: DiscKind) -> Option<String>;
}



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Verification Outcome.
pub enum Verification {
	/// # Matched; the Canonical Name.
	Verified(String),

	/// # Checksums Not in the Database.
	NotVerified,

	/// # No Database Covers This Profile.
	Unavailable,
}

impl fmt::Display for Verification {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Verified(name) => write!(f, "Verified OK: {name}"),
			Self::NotVerified => f.write_str("Not verified."),
			Self::Unavailable => f.write_str("Verification not available for this disc profile."),
		}
	}
}

impl Verification {
	#[must_use]
	/// # Verified?
	pub const fn is_verified(&self) -> bool { matches!(self, Self::Verified(_)) }
}



#[derive(Default)]
/// # Verifier.
///
/// Owns whichever databases were loaded (possibly none) and answers the
/// session's two questions: "is this dump known good?" and, mid-rip, "is
/// this first-MiB CRC a known Datel disc?".
pub struct Verifier {
	/// # Redump Database.
	redump: Option<Box<dyn ChecksumDb + Send>>,

	/// # Datel Database.
	datel: Option<Box<dyn ChecksumDb + Send>>,
}

impl Verifier {
	#[must_use]
	/// # With a Redump Database.
	pub fn with_redump(mut self, db: Box<dyn ChecksumDb + Send>) -> Self {
		self.redump.replace(db);
		self
	}

	#[must_use]
	/// # With a Datel Database.
	pub fn with_datel(mut self, db: Box<dyn ChecksumDb + Send>) -> Self {
		self.datel.replace(db);
		self
	}

	#[must_use]
	/// # Known Datel Key?
	///
	/// The mid-rip lookup: Datel discs are identified by the CRC32 of
	/// their first mebibyte long before the dump completes.
	pub fn is_known_datel(&self, crc100000: u32) -> bool {
		self.datel.as_ref().is_some_and(|db|
			db.find_crc32(crc100000, DiscKind::Datel).is_some()
		)
	}

	#[must_use]
	/// # Verify a Finished Dump.
	///
	/// Nintendo profiles check Redump (by MD5 when full checksums were
	/// calculated, by CRC32 otherwise), and Datel discs fall through to
	/// the Datel database by MD5. Profiles no database covers (DVD-Video,
	/// Audio CD) report `Unavailable` rather than failure.
	pub fn verify(&self, profile: &DiscProfile, digests: &DigestSummary) -> Verification {
		let kind = profile.kind();
		if ! kind.is_nintendo() { return Verification::Unavailable; }

		if kind == DiscKind::Datel {
			let hit = self.datel.as_ref().and_then(|db|
				digests.md5.as_deref().and_then(|md5| db.find_md5(md5, kind))
			);
			return match hit {
				Some(name) => Verification::Verified(name),
				None if self.datel.is_some() => Verification::NotVerified,
				None => Verification::Unavailable,
			};
		}

		let Some(db) = self.redump.as_ref().filter(|db| db.is_available(kind)) else {
			return Verification::Unavailable;
		};

		let hit = digests.md5.as_deref().map_or_else(
			|| db.find_crc32(digests.crc32, kind),
			|md5| db.find_md5(md5, kind),
		);
		hit.map_or(Verification::NotVerified, Verification::Verified)
	}
}



/// # Rename a Dump Set.
///
/// Apply a new base name to the image (or every `.partN` of it) plus any
/// sidecars that exist. Existing files at the target names are replaced,
/// missing sidecars are skipped silently.
///
/// ## Errors
///
/// Returns an error if an image part cannot be renamed; sidecar failures
/// are not fatal.
pub fn rename_outputs(
	dir: &Path,
	old: &str,
	new: &str,
	ext: &str,
	parts: Option<u32>,
	sidecars: &[&str],
) -> Result<(), RipError> {
	// The image itself.
	if let Some(parts) = parts {
		for i in 0..parts {
			let suffix = format!(".part{i}{ext}");
			rename_one(dir, old, new, &suffix)?;
		}
	}
	else { rename_one(dir, old, new, ext)?; }

	// Sidecars are best-effort.
	for suffix in sidecars {
		let src = dir.join(format!("{old}{suffix}"));
		if src.exists() { let _res = rename_one(dir, old, new, suffix); }
	}

	Ok(())
}

/// # Rename One File.
fn rename_one(dir: &Path, old: &str, new: &str, suffix: &str) -> Result<(), RipError> {
	let src = dir.join(format!("{old}{suffix}"));
	let dst = dir.join(format!("{new}{suffix}"));
	if dst.exists() { let _res = std::fs::remove_file(&dst); }
	std::fs::rename(&src, &dst)
		.map_err(|_| RipError::Rename(src.to_string_lossy().into_owned()))
}



#[cfg(test)]
mod test {
	use super::*;

	/// # One-Entry Database.
	struct OneHit {
		crc: u32,
		md5: &'static str,
		name: &'static str,
	}

	impl ChecksumDb for OneHit {
		fn is_available(&self, _kind: DiscKind) -> bool { true }
		fn find_crc32(&self, crc: u32, _kind: DiscKind) -> Option<String> {
			(crc == self.crc).then(|| self.name.to_owned())
		}
		fn find_md5(&self, md5: &str, _kind: DiscKind) -> Option<String> {
			(md5 == self.md5).then(|| self.name.to_owned())
		}
	}

	/// # Digests to Match.
	fn digests(md5: bool) -> DigestSummary {
		DigestSummary {
			crc32: 0xDEAD_BEEF,
			crc100000: Some(0x1234_5678),
			md5: md5.then(|| "aabbccddeeff00112233445566778899".to_owned()),
			sha1: None,
			bytes: 0,
		}
	}

	/// # GameCube Profile.
	fn gc_profile() -> DiscProfile {
		use crate::{
			DiscSource,
			RipOptions,
			SourceRead,
		};

		struct HeaderDisc;
		impl SourceRead for HeaderDisc {
			fn read(&mut self, dst: &mut [u8], offset: u64) -> Result<(), RipError> {
				for v in dst.iter_mut() { *v = 0; }
				if offset == 0 {
					dst[..6].copy_from_slice(b"G4BE01");
					dst[0x1C..0x20].copy_from_slice(&crate::NGC_MAGIC.to_be_bytes());
				}
				Ok(())
			}
		}
		impl DiscSource for HeaderDisc {}

		DiscProfile::detect(&mut HeaderDisc, &RipOptions::default(), None, 0)
			.expect("Detection failed.")
	}

	#[test]
	fn t_verify_md5_first() {
		let verifier = Verifier::default().with_redump(Box::new(OneHit {
			crc: 0xDEAD_BEEF,
			md5: "aabbccddeeff00112233445566778899",
			name: "Great Game (USA)",
		}));
		let profile = gc_profile();

		// MD5 available: matched by MD5.
		let v = verifier.verify(&profile, &digests(true));
		assert_eq!(v, Verification::Verified("Great Game (USA)".to_owned()));
		assert!(v.is_verified());

		// CRC32 fallback when checksums were skipped.
		let v = verifier.verify(&profile, &digests(false));
		assert!(v.is_verified(), "CRC32 fallback failed.");

		// A miss is a miss.
		let mut bad = digests(true);
		"00000000000000000000000000000000".clone_into(bad.md5.as_mut().expect("MD5 missing."));
		assert_eq!(verifier.verify(&profile, &bad), Verification::NotVerified);
	}

	#[test]
	fn t_verify_unavailable() {
		// No databases at all: unavailable, not failed.
		let verifier = Verifier::default();
		assert_eq!(
			verifier.verify(&gc_profile(), &digests(true)),
			Verification::Unavailable,
		);
	}

	#[test]
	fn t_verify_datel_key() {
		let verifier = Verifier::default().with_datel(Box::new(OneHit {
			crc: 0x1234_5678,
			md5: "ffffffffffffffffffffffffffffffff",
			name: "Action Replay",
		}));
		assert!(verifier.is_known_datel(0x1234_5678));
		assert!(! verifier.is_known_datel(0x9999_9999));
	}

	#[test]
	fn t_rename_outputs() {
		let dir = tempfile::tempdir().expect("Tempdir failed.");
		let root = dir.path();
		for name in ["old.part0.iso", "old.part1.iso", "old.bca", "old-dumpinfo.txt"] {
			std::fs::write(root.join(name), b"x").expect("Write failed.");
		}

		rename_outputs(root, "old", "New Name", ".iso", Some(2), &[".bca", "-dumpinfo.txt", ".skp"])
			.expect("Rename failed.");

		for name in ["New Name.part0.iso", "New Name.part1.iso", "New Name.bca", "New Name-dumpinfo.txt"] {
			assert!(root.join(name).exists(), "Missing {name}.");
		}
		assert!(! root.join("old.part0.iso").exists(), "Original left behind.");
	}
}
