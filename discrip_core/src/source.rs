/*!
# DiscRip: Disc Sources
*/

use crate::{
	AudioToc,
	CdText,
	CDDA_MAX_REQUEST_SECTORS,
	Msf,
	RipError,
	SECTOR_CDDA,
	SECTOR_USB,
	TocEntry,
};
use std::{
	fs::File,
	io::{
		Read,
		Seek,
		SeekFrom,
	},
	path::Path,
};



/// # Lead-Out Pseudo-Track Number.
const LEADOUT_TRACK: u8 = 0xAA;

/// # BCA Descriptor Header Length.
///
/// DVD structure reads prefix the payload with a 4-byte length header.
const BCA_HEADER: usize = 4;

/// # Media Catalog Number Length.
const MCN_LEN: usize = 13;

/// # ISRC Length.
const ISRC_LEN: usize = 12;



/// # Byte-Offset Reader.
///
/// The one operation every disc source must support: fill `dst` from the
/// given absolute byte offset, entirely or not at all.
pub trait SourceRead {
	/// # Read.
	///
	/// ## Errors
	///
	/// Returns an error if the source cannot satisfy the request in full.
	fn read(&mut self, dst: &mut [u8], offset: u64) -> Result<(), RipError>;
}

/// # Disc Source.
///
/// A readable source plus the auxiliary queries a full rip wants. The
/// default implementations report `Unsupported`, which is accurate for
/// plain block devices.
pub trait DiscSource: SourceRead {
	/// # Burst Cutting Area.
	///
	/// ## Errors
	///
	/// Returns an error if the source has no BCA surface.
	fn read_bca(&mut self) -> Result<Vec<u8>, RipError> { Err(RipError::Unsupported) }

	/// # Audio Table of Contents.
	///
	/// ## Errors
	///
	/// Returns an error if the source cannot report a TOC.
	fn read_toc(&mut self) -> Result<AudioToc, RipError> { Err(RipError::Unsupported) }

	/// # Stop the Motor.
	fn motor_off(&mut self, _eject: bool) {}
}



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # One Raw CDDA Read Request.
///
/// The control request addresses the disc in 2048-byte logical units even
/// though each returned sector carries 2352 bytes; `disk_offset` is the
/// CDDA sector index times 2048.
pub struct CddaRequest {
	/// # Logical Disk Offset.
	pub disk_offset: u64,

	/// # Sectors Requested (1..=27).
	pub sector_count: u32,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Subchannel Query Kind.
pub enum SubchannelKind {
	/// # Media Catalog Number.
	Mcn,

	/// # Per-Track Recording Code.
	Isrc,
}

#[derive(Debug, Clone, Default)]
/// # Raw Subchannel Response.
pub struct Subchannel {
	/// # Control Byte.
	///
	/// Bit 7 is the "valid" flag; the identifier is junk without it.
	pub control: u8,

	/// # Identifier Bytes.
	pub text: Vec<u8>,
}

impl Subchannel {
	#[must_use]
	/// # Valid?
	pub const fn is_valid(&self) -> bool { self.control & 0b1000_0000 != 0 }

	#[must_use]
	/// # Media Catalog Number.
	///
	/// Thirteen ASCII digits, or nothing.
	pub fn mcn(&self) -> Option<String> {
		if ! self.is_valid() { return None; }
		let raw = self.text.get(..MCN_LEN)?;
		if raw.iter().all(u8::is_ascii_digit) {
			Some(String::from_utf8_lossy(raw).into_owned())
		}
		else { None }
	}

	#[must_use]
	/// # International Standard Recording Code.
	///
	/// Twelve ASCII characters, or nothing.
	pub fn isrc(&self) -> Option<String> {
		if ! self.is_valid() { return None; }
		let raw = self.text.get(..ISRC_LEN)?;
		if raw.iter().all(|b| b.is_ascii_alphanumeric()) {
			Some(String::from_utf8_lossy(raw).into_owned())
		}
		else { None }
	}
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # One Raw TOC Point.
pub struct TocPoint {
	/// # Track Number (`0xAA` for the Lead-Out).
	pub number: u8,

	/// # Control Bits.
	pub control: u8,

	/// # Absolute Start.
	pub start: Msf,
}

#[derive(Debug, Clone, Default)]
/// # Raw Table of Contents.
pub struct RawToc {
	/// # First Track Number.
	pub first: u8,

	/// # Last Track Number.
	pub last: u8,

	/// # Points, Lead-Out Included.
	pub points: Vec<TocPoint>,
}



/// # Drive Capability Surface.
///
/// Everything platform-specific about talking to an optical drive lives
/// behind this trait; the engine itself never names a platform. Only
/// `read_logical` is mandatory; the rest degrade to `Unsupported`, which
/// simply narrows what the engine can do with the drive.
pub trait DriveControl {
	/// # Medium Present?
	fn is_medium_present(&mut self) -> bool { true }

	/// # Logical 2048-Byte-Sector Read.
	///
	/// ## Errors
	///
	/// Returns an error on any short read.
	fn read_logical(&mut self, dst: &mut [u8], offset: u64) -> Result<(), RipError>;

	/// # Raw CDDA Read.
	///
	/// One control request, at most 27 sectors.
	///
	/// ## Errors
	///
	/// Returns an error if raw reads are unsupported or the request fails.
	fn read_cdda(&mut self, _dst: &mut [u8], _req: CddaRequest) -> Result<(), RipError> {
		Err(RipError::Unsupported)
	}

	/// # Raw BCA Descriptor (DVD Physical Format 3).
	///
	/// The returned bytes include the 4-byte length header.
	///
	/// ## Errors
	///
	/// Returns an error if the disc has no BCA.
	fn read_bca(&mut self) -> Result<Vec<u8>, RipError> { Err(RipError::Unsupported) }

	/// # Raw Table of Contents.
	///
	/// ## Errors
	///
	/// Returns an error if the TOC cannot be read.
	fn read_toc(&mut self) -> Result<RawToc, RipError> { Err(RipError::Unsupported) }

	/// # Raw CD-TEXT Pack Stream.
	///
	/// ## Errors
	///
	/// Returns an error if the disc carries no CD-TEXT.
	fn read_cd_text(&mut self) -> Result<Vec<u8>, RipError> { Err(RipError::Unsupported) }

	/// # Q-Subchannel Identifier.
	///
	/// The track number is ignored for MCN queries.
	///
	/// ## Errors
	///
	/// Returns an error if subchannel queries are unsupported.
	fn read_subchannel(&mut self, _kind: SubchannelKind, _track: u8)
	-> Result<Subchannel, RipError> {
		Err(RipError::Unsupported)
	}

	/// # Stop the Motor.
	fn motor_off(&mut self, _eject: bool) {}
}



/// # Optical Drive.
///
/// A disc source backed by a [`DriveControl`] adapter. Reads whose length
/// is a whole number of 2352-byte sectors take the raw CDDA path, split
/// into requests of at most 27 sectors; everything else goes through the
/// logical 2048-byte-sector path.
pub struct OpticalDrive {
	/// # Platform Adapter.
	ctl: Box<dyn DriveControl + Send>,

	/// # Cached TOC.
	toc: Option<AudioToc>,
}

impl SourceRead for OpticalDrive {
	fn read(&mut self, dst: &mut [u8], offset: u64) -> Result<(), RipError> {
		// Raw CDDA path.
		if ! dst.is_empty() && dst.len() % (SECTOR_CDDA as usize) == 0 {
			let mut done = 0;
			let max = (SECTOR_CDDA * CDDA_MAX_REQUEST_SECTORS) as usize;
			while done < dst.len() {
				let chunk = usize::min(dst.len() - done, max);
				let req = CddaRequest {
					disk_offset: (offset + done as u64) / u64::from(SECTOR_CDDA) * 2048,
					sector_count: (chunk as u32) / SECTOR_CDDA,
				};
				self.ctl.read_cdda(&mut dst[done..done + chunk], req)?;
				done += chunk;
			}
			Ok(())
		}
		// Logical path.
		else { self.ctl.read_logical(dst, offset) }
	}
}

impl DiscSource for OpticalDrive {
	/// # Burst Cutting Area.
	///
	/// For DVD media this is the physical-format-3 descriptor with its
	/// length header stripped. An Audio CD has no BCA, so instead a
	/// stand-in is synthesized from the catalog number and track ISRCs so
	/// the disc still gets a per-copy fingerprint.
	fn read_bca(&mut self) -> Result<Vec<u8>, RipError> {
		if let Some(toc) = self.toc.as_ref().filter(|t| t.is_audio()) {
			let mut out = Vec::new();
			if let Some(mcn) = toc.mcn.as_deref() { out.extend_from_slice(mcn.as_bytes()); }
			for t in &toc.tracks {
				if let Some(isrc) = t.isrc.as_deref() { out.extend_from_slice(isrc.as_bytes()); }
			}
			if out.is_empty() { Err(RipError::Unsupported) }
			else { Ok(out) }
		}
		else {
			let mut raw = self.ctl.read_bca()?;
			if raw.len() <= BCA_HEADER { return Err(RipError::Unsupported); }
			raw.drain(..BCA_HEADER);
			Ok(raw)
		}
	}

	fn read_toc(&mut self) -> Result<AudioToc, RipError> {
		if let Some(toc) = self.toc.as_ref() { return Ok(toc.clone()); }

		let raw = self.ctl.read_toc()?;
		let mut toc = AudioToc {
			first: raw.first,
			last: raw.last,
			..AudioToc::default()
		};

		let mut leadout = None;
		for point in raw.points {
			if point.number == LEADOUT_TRACK { leadout.replace(point.start); }
			else {
				toc.tracks.push(TocEntry {
					number: point.number,
					control: point.control,
					start: point.start,
					..TocEntry::default()
				});
			}
		}

		// A TOC without a lead-out cannot size the dump.
		toc.leadout = leadout.ok_or(RipError::Toc)?;

		// The extras are all optional; failures simply leave gaps.
		if let Ok(raw) = self.ctl.read_cd_text() {
			let text = CdText::parse(&raw);
			toc.album_title = text.title(0).map(ToOwned::to_owned);
			toc.album_performer = text.performer(0).map(ToOwned::to_owned);
			for t in &mut toc.tracks {
				t.title = text.title(t.number).map(ToOwned::to_owned);
				t.performer = text.performer(t.number).map(ToOwned::to_owned);
			}
		}
		if let Ok(sub) = self.ctl.read_subchannel(SubchannelKind::Mcn, 0) {
			toc.mcn = sub.mcn();
		}
		for t in &mut toc.tracks {
			if let Ok(sub) = self.ctl.read_subchannel(SubchannelKind::Isrc, t.number) {
				t.isrc = sub.isrc();
			}
		}

		self.toc.replace(toc.clone());
		Ok(toc)
	}

	fn motor_off(&mut self, eject: bool) { self.ctl.motor_off(eject); }
}

impl OpticalDrive {
	/// # New.
	///
	/// ## Errors
	///
	/// Returns `NoMedium` if the drive reports an empty tray.
	pub fn new(mut ctl: Box<dyn DriveControl + Send>) -> Result<Self, RipError> {
		if ctl.is_medium_present() {
			Ok(Self { ctl, toc: None })
		}
		else { Err(RipError::NoMedium) }
	}
}



#[derive(Debug)]
/// # USB Mass-Storage Source.
///
/// A plain block device (or image file) holding a previously-extracted
/// disc. Reads must be aligned to the 512-byte storage sector on both
/// ends; there is no TOC, CDDA, or BCA surface.
pub struct UsbMassStorage {
	/// # Backing Device.
	file: File,
}

impl SourceRead for UsbMassStorage {
	fn read(&mut self, dst: &mut [u8], offset: u64) -> Result<(), RipError> {
		let mask = u64::from(SECTOR_USB - 1);
		if offset & mask != 0 || (dst.len() as u64) & mask != 0 {
			return Err(RipError::Alignment);
		}

		self.file.seek(SeekFrom::Start(offset))
			.and_then(|_| self.file.read_exact(dst))
			.map_err(|e| RipError::DiscRead(e.raw_os_error().unwrap_or(-1)))
	}
}

impl DiscSource for UsbMassStorage {}

impl UsbMassStorage {
	/// # Open a Device Path.
	///
	/// ## Errors
	///
	/// Returns an error if the path cannot be opened for reading.
	pub fn open<P>(path: P) -> Result<Self, RipError>
	where P: AsRef<Path> {
		let path = path.as_ref();
		File::open(path)
			.map(|file| Self { file })
			.map_err(|_| RipError::DeviceOpen(Some(path.to_string_lossy().into_owned())))
	}

	#[must_use]
	/// # From an Open Handle.
	pub const fn from_file(file: File) -> Self { Self { file } }
}
