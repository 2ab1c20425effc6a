/*!
# DiscRip: Drive Striping
*/

use crate::{
	AudioToc,
	DiscSource,
	RipError,
	SourceRead,
	STRIPE_BYTES,
};



/// # Drive Striper.
///
/// Fans reads across an ordered set of source drives on 1 MiB boundaries;
/// the drive for a given request is `(offset / stripe) mod N`. Optical
/// drives have independent mechanical queues, so interleaving them
/// overlaps their seek latencies.
///
/// A single [`read`](SourceRead::read) may not cross a stripe boundary;
/// [`read_spanning`](DriveStriper::read_spanning) handles arbitrary
/// ranges. Failed reads are reported, never rerouted; retry policy belongs
/// to the recovery layer.
///
/// Auxiliary queries (TOC, BCA, motor control) go to the first drive.
pub struct DriveStriper {
	/// # Source Drives, in Stripe Order.
	drives: Vec<Box<dyn DiscSource + Send>>,
}

impl SourceRead for DriveStriper {
	fn read(&mut self, dst: &mut [u8], offset: u64) -> Result<(), RipError> {
		if STRIPE_BYTES < offset % STRIPE_BYTES + dst.len() as u64 {
			return Err(RipError::Bug("Read crosses a stripe boundary"));
		}

		let idx = self.drive_for(offset);
		self.drives[idx].read(dst, offset)
	}
}

impl DiscSource for DriveStriper {
	fn read_bca(&mut self) -> Result<Vec<u8>, RipError> {
		self.drives[0].read_bca()
	}

	fn read_toc(&mut self) -> Result<AudioToc, RipError> {
		self.drives[0].read_toc()
	}

	fn motor_off(&mut self, eject: bool) {
		for d in &mut self.drives { d.motor_off(eject); }
	}
}

impl DriveStriper {
	/// # New.
	///
	/// ## Errors
	///
	/// The drive list must not be empty.
	pub fn new(drives: Vec<Box<dyn DiscSource + Send>>) -> Result<Self, RipError> {
		if drives.is_empty() { Err(RipError::DeviceOpen(None)) }
		else { Ok(Self { drives }) }
	}

	#[must_use]
	/// # Single Drive.
	pub fn single(drive: Box<dyn DiscSource + Send>) -> Self {
		Self { drives: vec![drive] }
	}

	#[must_use]
	/// # Number of Drives.
	pub fn len(&self) -> usize { self.drives.len() }

	#[must_use]
	/// # Empty?
	///
	/// Construction forbids it, so this is always `false`.
	pub fn is_empty(&self) -> bool { self.drives.is_empty() }

	/// # Drive Index for an Offset.
	fn drive_for(&self, offset: u64) -> usize {
		((offset / STRIPE_BYTES) % self.drives.len() as u64) as usize
	}

	/// # Read Across Stripes.
	///
	/// Split an arbitrary request into per-stripe segments and read each
	/// from its owning drive. Succeeds only if every segment does.
	///
	/// ## Errors
	///
	/// Returns the first segment failure.
	pub fn read_spanning(&mut self, dst: &mut [u8], offset: u64) -> Result<(), RipError> {
		let mut done = 0;
		while done < dst.len() {
			let at = offset + done as u64;
			let room = (STRIPE_BYTES - at % STRIPE_BYTES) as usize;
			let chunk = usize::min(dst.len() - done, room);
			let idx = self.drive_for(at);
			self.drives[idx].read(&mut dst[done..done + chunk], at)?;
			done += chunk;
		}
		Ok(())
	}
}



#[cfg(test)]
mod test {
	use super::*;

	/// # Tattling Source.
	///
	/// Fills reads with its own drive index so tests can see who served
	/// what.
	struct TattleSource(u8);

	impl SourceRead for TattleSource {
		fn read(&mut self, dst: &mut [u8], _offset: u64) -> Result<(), RipError> {
			for v in dst { *v = self.0; }
			Ok(())
		}
	}

	impl DiscSource for TattleSource {}

	/// # Three-Drive Striper.
	fn striper() -> DriveStriper {
		DriveStriper::new(vec![
			Box::new(TattleSource(0)),
			Box::new(TattleSource(1)),
			Box::new(TattleSource(2)),
		]).expect("Striper failed.")
	}

	#[test]
	fn t_stripe_selection() {
		let mut s = striper();
		let mut buf = [0_u8; 4];

		// Offsets in successive stripes round-robin the drives.
		for (offset, want) in [
			(0_u64, 0_u8),
			(STRIPE_BYTES - 4, 0),
			(STRIPE_BYTES, 1),
			(STRIPE_BYTES * 2, 2),
			(STRIPE_BYTES * 3, 0),
			(STRIPE_BYTES * 7 + 512, 1),
		] {
			s.read(&mut buf, offset).expect("Read failed.");
			assert_eq!(buf, [want; 4], "Wrong drive for offset {offset}.");
		}
	}

	#[test]
	fn t_stripe_boundary() {
		let mut s = striper();

		// Reads may touch, but never cross, a stripe edge.
		let mut buf = [0_u8; 8];
		assert!(s.read(&mut buf, STRIPE_BYTES - 8).is_ok());
		assert!(s.read(&mut buf, STRIPE_BYTES - 4).is_err(), "Crossing read allowed.");

		// The spanning helper splits it instead: 0..=3 from drive 0,
		// 4..=7 from drive 1.
		s.read_spanning(&mut buf, STRIPE_BYTES - 4).expect("Spanning read failed.");
		assert_eq!(buf, [0, 0, 0, 0, 1, 1, 1, 1], "Bad segment split.");
	}

	#[test]
	fn t_stripe_empty() {
		assert!(DriveStriper::new(Vec::new()).is_err(), "Empty striper allowed.");
	}
}
