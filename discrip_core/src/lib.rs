/*!
# DiscRip: Library
*/

#![forbid(unsafe_code)]

#![deny(
	clippy::allow_attributes_without_reason,
	clippy::correctness,
	unreachable_pub,
)]

#![warn(
	clippy::complexity,
	clippy::nursery,
	clippy::pedantic,
	clippy::perf,
	clippy::style,

	clippy::allow_attributes,
	clippy::clone_on_ref_ptr,
	clippy::create_dir,
	clippy::filetype_is_file,
	clippy::format_push_string,
	clippy::get_unwrap,
	clippy::impl_trait_in_params,
	clippy::lossy_float_literal,
	clippy::missing_assert_message,
	clippy::missing_docs_in_private_items,
	clippy::needless_raw_strings,
	clippy::panic_in_result_fn,
	clippy::pub_without_shorthand,
	clippy::rest_pat_in_fully_bound_structs,
	clippy::semicolon_inside_block,
	clippy::str_to_string,
	clippy::string_to_string,
	clippy::todo,
	clippy::unneeded_field_pattern,
	clippy::unseparated_literal_suffix,
	clippy::unwrap_in_result,

	macro_use_extern_crate,
	missing_docs,
	non_ascii_idents,
	trivial_casts,
	trivial_numeric_casts,
	unused_crate_dependencies,
	unused_extern_crates,
	unused_import_braces,
)]

mod abort;
mod block;
mod cdtext;
mod chunk;
mod digest;
mod error;
mod opts;
mod profile;
mod recover;
mod rip;
mod sidecar;
mod source;
mod stripe;
mod toc;
mod verify;
mod writer;

pub use abort::KillSwitch;
pub(crate) use block::ReadBlock;
pub use cdtext::CdText;
pub use chunk::ChunkPlan;
pub use digest::{
	DigestPipeline,
	DigestSummary,
};
pub use error::RipError;
pub use opts::{
	AudioOutput,
	ChunkSize,
	DualLayer,
	NewDevice,
	RipOptions,
};
pub use profile::{
	DiscKind,
	DiscProfile,
	ForceKind,
	sanitize_name,
};
pub use recover::{
	RangeLog,
	RecoveryController,
};
pub(crate) use recover::RecoveryTally;
pub use rip::{
	ProgressReport,
	RipEvents,
	RipOutcome,
	RipSession,
};
pub use sidecar::{
	bca_bits,
	WavForm,
	write_bca,
	write_cue,
	write_dump_info,
};
pub use source::{
	CddaRequest,
	DiscSource,
	DriveControl,
	OpticalDrive,
	RawToc,
	SourceRead,
	Subchannel,
	SubchannelKind,
	TocPoint,
	UsbMassStorage,
};
pub use stripe::DriveStriper;
pub use toc::{
	AudioToc,
	Msf,
	TocEntry,
};
pub use verify::{
	ChecksumDb,
	rename_outputs,
	Verification,
	Verifier,
};
pub(crate) use writer::{
	WriterCommand,
	WriterTask,
};



// Sector Geometry
// ---------------

/// # Logical (ISO) Sector Size.
pub const SECTOR_ISO: u32 = 2048;

/// # Raw CDDA Sector Size.
pub const SECTOR_CDDA: u32 = 2352;

/// # Smallest Addressable Unit of a USB Mass-Storage Device.
pub const SECTOR_USB: u32 = 512;

/// # CDDA Sectors Per Raw-Read Request.
///
/// Raw-audio control requests larger than ~64 KiB trip driver transfer
/// caps, so reads are split at 27 sectors.
pub const CDDA_MAX_REQUEST_SECTORS: u32 = 27;

/// # Number of Lead-In Frames.
///
/// Audio discs reserve a two-second region before the first track. TOC
/// addresses include it; file offsets don't.
pub const CD_LEADIN: u32 = 150;

/// # CD Frames Per Second.
pub const CD_FPS: u32 = 75;



// Disc Sizes (Sectors)
// ---------------

/// # GameCube Magic Word (Header Offset 0x1C).
pub const NGC_MAGIC: u32 = 0xC233_9F3D;

/// # Wii Magic Word (Header Offset 0x18).
pub const WII_MAGIC: u32 = 0x5D1C_9EA3;

/// # GameCube Image Size.
pub const NGC_DISC_SIZE: u32 = 0x0118_2400;

/// # Wii Mini (1.4 GB) Image Size.
pub const WII_D1_SIZE: u32 = 712_880;

/// # Wii Single-Layer (4.4 GB) Image Size.
pub const WII_D5_SIZE: u32 = 2_294_912;

/// # Wii Dual-Layer (8 GB) Image Size.
pub const WII_D9_SIZE: u32 = 4_155_840;

/// # Audio CD Fallback Size.
///
/// An 80-minute disc at 75 sectors/second, used when the TOC cannot be
/// read.
pub const AUDIO_CD_FALLBACK_SECTORS: u32 = 360_000;



// Acquisition
// ---------------

/// # Target Read-Block Size (Bytes).
pub const READ_SIZE: u32 = 0x10_0000;

/// # CDDA Sectors Per Read Block.
pub(crate) const CDDA_BLOCK_SECTORS: u32 = 96;

/// # CDDA Sectors Per Read Block (WavBest).
pub(crate) const CDDA_BLOCK_SECTORS_BEST: u32 = 32;

/// # Pre-Allocated Read Blocks.
///
/// Every block is in exactly one queue (or held by the rip loop) at any
/// given instant, capping buffered memory at `BLOCK_COUNT` blocks.
pub(crate) const BLOCK_COUNT: usize = 8;

/// # Writer Inbox Depth.
pub(crate) const QUEUE_DEPTH: usize = 8;

/// # Stripe Width (Bytes).
///
/// Multi-drive reads are fanned out on 1 MiB boundaries.
pub const STRIPE_BYTES: u64 = 0x10_0000;

/// # Datel Identification Key Length (Bytes).
///
/// The CRC32 of the first 1 MiB doubles as the Datel database key.
pub(crate) const DATEL_KEY_BYTES: u64 = 0x10_0000;

/// # One Gibibyte.
pub(crate) const GIB: u64 = 1024 * 1024 * 1024;
