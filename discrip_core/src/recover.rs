/*!
# DiscRip: Read Recovery
*/

use crate::{
	AudioOutput,
	DriveStriper,
	ReadBlock,
	RipError,
};
use dactyl::NiceU64;
use fyi_msg::Msg;
use std::{
	fs::File,
	io::Write,
	path::{
		Path,
		PathBuf,
	},
	time::Duration,
};



/// # Diagnostic Mask.
///
/// A console notice is emitted whenever the failed-sector count passes a
/// multiple of sixty-four (i.e. `count & 63 == 1`).
const DIAGNOSTIC_MASK: u64 = 63;



#[derive(Debug, Clone, Copy)]
/// # Recovery Controller.
///
/// Optical reads fail, and for audio (or intentionally-mangled Datel)
/// media a failure is information, not a reason to stop. This wraps the
/// raw read path with a bounded retry budget, an optional sector-by-sector
/// fallback for failed blocks, and zero-fill-plus-log for whatever remains
/// unrecoverable.
pub struct RecoveryController {
	/// # Attempts Per Read.
	attempts: u32,

	/// # Retry Failed Blocks Sector-by-Sector?
	sector_fallback: bool,
}

impl RecoveryController {
	#[must_use]
	/// # Audio Policy.
	pub const fn for_audio(mode: AudioOutput) -> Self {
		Self {
			attempts: mode.attempts(),
			sector_fallback: mode.sector_fallback(),
		}
	}

	#[must_use]
	/// # Datel Policy.
	///
	/// Datel discs place unreadable regions on purpose; two attempts are
	/// plenty before skipping ahead.
	pub const fn for_datel() -> Self {
		Self {
			attempts: 2,
			sector_fallback: true,
		}
	}

	#[must_use]
	/// # Attempts Per Read.
	pub const fn attempts(&self) -> u32 { self.attempts }

	/// # Read With Retries.
	///
	/// Failed attempts back off `1000 + attempt × 500` microseconds before
	/// trying again.
	///
	/// ## Errors
	///
	/// Returns the last read error once the budget is spent.
	fn read_with_retries(
		&self,
		src: &mut DriveStriper,
		dst: &mut [u8],
		offset: u64,
	) -> Result<(), RipError> {
		let mut last = RipError::DiscRead(-1);
		for attempt in 0..self.attempts {
			match src.read_spanning(dst, offset) {
				Ok(()) => return Ok(()),
				Err(e) => { last = e; },
			}
			std::thread::sleep(Duration::from_micros(1000 + u64::from(attempt) * 500));
		}
		Err(last)
	}

	/// # Read One Block, Recovering What It Can.
	///
	/// The whole block is tried first. If that fails and the fallback is
	/// enabled, each sector is retried individually with the same budget;
	/// recovered sectors land at their proper offsets and unrecoverable
	/// ones are zero-filled, with contiguous runs coalesced into the log.
	/// Without the fallback, the entire block is zeroed and logged as one
	/// range.
	///
	/// This never returns a read error (that is the point), but the
	/// tally records how much was lost.
	pub(crate) fn read_block(
		&self,
		src: &mut DriveStriper,
		block: &mut ReadBlock,
		sector_size: u32,
		log: Option<&mut RangeLog>,
		tally: &mut RecoveryTally,
	) {
		let start_lba = block.sector_start();
		let sectors = block.sector_count();
		let dst = block.bytes_mut();
		tally.sectors += u64::from(sectors);

		if self.read_with_retries(src, dst, u64::from(start_lba) * u64::from(sector_size)).is_ok() {
			return;
		}

		let mut log = log;
		if self.sector_fallback && sectors > 1 {
			let mut run_start = 0_u32;
			let mut run_len = 0_u32;
			for s in 0..sectors {
				let lba = start_lba + s;
				let lo = (s * sector_size) as usize;
				let hi = lo + sector_size as usize;
				let sector = &mut dst[lo..hi];

				if self.read_with_retries(src, sector, u64::from(lba) * u64::from(sector_size)).is_ok() {
					// A good sector closes any open run.
					if run_len > 0 {
						if let Some(log) = log.as_deref_mut() { log.push(run_start, run_len); }
						run_len = 0;
					}
				}
				else {
					sector.fill(0);
					if run_len == 0 { run_start = lba; }
					run_len += 1;
					tally.fail(lba);
				}
			}
			if run_len > 0 {
				if let Some(log) = log.as_deref_mut() { log.push(run_start, run_len); }
			}
		}
		else {
			dst.fill(0);
			if let Some(log) = log.as_deref_mut() { log.push(start_lba, sectors); }
			for s in 0..sectors { tally.fail(start_lba + s); }
		}
	}
}



#[derive(Debug, Clone, Copy, Default)]
/// # Recovery Tally.
///
/// Running totals for one rip, used for the end-of-dump report and the
/// everything-failed bailout.
pub(crate) struct RecoveryTally {
	/// # Sectors Attempted.
	pub(crate) sectors: u64,

	/// # Sectors Lost.
	pub(crate) failed: u64,
}

impl RecoveryTally {
	/// # Record One Lost Sector.
	fn fail(&mut self, lba: u32) {
		self.failed += 1;
		if self.failed & DIAGNOSTIC_MASK == 1 {
			Msg::warning(format!(
				"Read errors: {} sectors zero-filled so far (last LBA {lba}).",
				NiceU64::from(self.failed),
			)).eprint();
		}
	}

	/// # Did Everything Fail?
	pub(crate) const fn all_failed(&self) -> bool {
		self.sectors != 0 && self.failed == self.sectors
	}
}



#[derive(Debug)]
/// # Bad-Range Log.
///
/// The append-only `(start_lba, sector_count)` manifest backing the
/// `.bad` (audio) and `.skp` (Datel) sidecars. Ranges are written through
/// as they arrive so a crashed rip still leaves its breadcrumbs.
pub struct RangeLog {
	/// # Destination.
	path: PathBuf,

	/// # Open Handle.
	file: File,

	/// # Ranges So Far.
	ranges: Vec<(u32, u32)>,
}

impl RangeLog {
	/// # Create.
	///
	/// Any existing file at `path` is replaced; the comment header lands
	/// immediately.
	///
	/// ## Errors
	///
	/// Returns an error if the file cannot be created.
	pub fn create<P>(path: P, comment: &str) -> Result<Self, RipError>
	where P: AsRef<Path> {
		let path = path.as_ref().to_path_buf();
		let mut file = File::create(&path)
			.map_err(|_| RipError::Create(path.to_string_lossy().into_owned()))?;
		file.write_all(format!("# {comment}\n").as_bytes())
			.map_err(|_| RipError::Write(path.to_string_lossy().into_owned()))?;

		Ok(Self {
			path,
			file,
			ranges: Vec::new(),
		})
	}

	/// # Append a Range.
	pub fn push(&mut self, start_lba: u32, sectors: u32) {
		self.ranges.push((start_lba, sectors));
		let _res = self.file.write_all(format!("{start_lba},{sectors}\n").as_bytes());
	}

	#[must_use]
	/// # Logged Anything?
	pub fn is_empty(&self) -> bool { self.ranges.is_empty() }

	#[must_use]
	/// # Ranges So Far.
	pub fn ranges(&self) -> &[(u32, u32)] { &self.ranges }

	/// # Flush and Close.
	///
	/// Returns the path, or `None` if nothing was ever logged (in which
	/// case the file is removed rather than left around empty).
	pub fn finish(mut self) -> Option<PathBuf> {
		let _res = self.file.flush();
		if self.ranges.is_empty() {
			let _res = std::fs::remove_file(&self.path);
			None
		}
		else { Some(self.path) }
	}
}
