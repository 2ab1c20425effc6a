/*!
# DiscRip: Errors
*/

#[cfg(feature = "bin")] use argyle::ArgyleError;
use fyi_msg::Msg;
use std::{
	error::Error,
	fmt,
};



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Errors.
pub enum RipError {
	/// # Every Audio Block Was Unrecoverable.
	AllAudioBlocksFailed,

	/// # Unaligned Mass-Storage Read.
	Alignment,

	/// # Bug!
	Bug(&'static str),

	/// # User Abort.
	Cancelled,

	/// # Unable to Create an Output File.
	Create(String),

	/// # Unable to Open a Source Device.
	DeviceOpen(Option<String>),

	/// # Read Failure (Platform Code).
	DiscRead(i32),

	/// # No Disc in the Drive.
	NoMedium,

	/// # Numbers Too Big for the Architecture.
	Overflow,

	/// # Unable to Rename an Output File.
	Rename(String),

	/// # Unable to Read the Table of Contents.
	Toc,

	/// # Unclassifiable Disc.
	UnknownDisc,

	/// # Operation Unsupported by the Source.
	Unsupported,

	/// # Writing to Disk.
	Write(String),

	#[cfg(feature = "bin")]
	/// # Argyle Passthrough.
	Argue(ArgyleError),

	#[cfg(feature = "bin")]
	/// # Invalid CLI Arg.
	CliArg(String),

	#[cfg(feature = "bin")]
	/// # CLI Parsing Failure.
	CliParse(&'static str),
}

impl Error for RipError {}

#[cfg(feature = "bin")]
impl From<ArgyleError> for RipError {
	#[inline]
	fn from(err: ArgyleError) -> Self { Self::Argue(err) }
}

impl From<RipError> for Msg {
	#[inline]
	fn from(src: RipError) -> Self { Self::error(src.to_string()) }
}

impl fmt::Display for RipError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::AllAudioBlocksFailed => f.write_str("Audio read failed (all blocks)."),
			Self::Alignment => f.write_str("Mass-storage reads must be 512-byte aligned."),
			Self::Bug(s) => write!(f, "Bug: {s}."),
			Self::Cancelled => f.write_str("Copy Cancelled."),
			Self::Create(s) => write!(f, "Failed to create file: {s}."),
			Self::DeviceOpen(s) =>
				if let Some(s) = s { write!(f, "Unable to open source device {s}.") }
				else { f.write_str("Unable to open source device.") },
			Self::DiscRead(code) => write!(f, "Disc read error [{code:08X}]."),
			Self::NoMedium => f.write_str("No disc detected."),
			Self::Overflow => f.write_str("The numbers are too big for this system architecture."),
			Self::Rename(s) => write!(f, "Rename failed: {s}."),
			Self::Toc => f.write_str("Unable to read the table of contents."),
			Self::UnknownDisc => f.write_str("Failed to detect the disc type."),
			Self::Unsupported => f.write_str("The source does not support this operation."),
			Self::Write(s) => write!(f, "Unable to write to {s}."),

			#[cfg(feature = "bin")]
			Self::Argue(e) => write!(f, "{e}"),

			#[cfg(feature = "bin")]
			Self::CliArg(s) => write!(f, "Invalid CLI option: {s}"),

			#[cfg(feature = "bin")]
			Self::CliParse(s) => write!(f, "Unable to parse {s}."),
		}
	}
}
