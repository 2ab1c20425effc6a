/*!
# DiscRip
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



use argyle::{
	Argue,
	ArgyleError,
	FLAG_HELP,
	FLAG_VERSION,
};
use dactyl::{
	NiceU64,
	traits::BytesToUnsigned,
};
use discrip_core::{
	AudioOutput,
	ChunkSize,
	DiscProfile,
	DiscSource,
	DriveStriper,
	DualLayer,
	ForceKind,
	KillSwitch,
	NewDevice,
	ProgressReport,
	RipError,
	RipEvents,
	RipOptions,
	RipOutcome,
	RipSession,
	UsbMassStorage,
	Verifier,
};
use fyi_msg::{
	Msg,
	Progless,
};
use std::{
	borrow::Cow,
	path::PathBuf,
	sync::{
		atomic::{
			AtomicBool,
			Ordering::{
				Relaxed,
				SeqCst,
			},
		},
		Arc,
	},
};



/// # Main.
///
/// This lets us bubble up startup errors so they can be pretty-printed.
fn main() {
	match _main() {
		Ok(()) => {},
		Err(RipError::Argue(ArgyleError::WantsVersion)) => {
			println!(concat!("DiscRip v", env!("CARGO_PKG_VERSION")));
		},
		Err(RipError::Argue(ArgyleError::WantsHelp)) => { helper(); },
		Err(RipError::Cancelled) => {
			// A cancelled copy keeps its partial file and is not a
			// failure; say so and leave quietly.
			Msg::warning("Copy Cancelled. The partial dump has been kept.").eprint();
		},
		Err(e) => {
			let code = exit_code(&e);
			Msg::from(e).eprint();
			std::process::exit(code);
		},
	}
}

#[inline]
/// # Actual Main.
fn _main() -> Result<(), RipError> {
	// Load CLI arguments, if any.
	let args = Argue::new(FLAG_HELP | FLAG_VERSION)?;

	// Check for unknown args.
	if let Some(boo) = args.check_keys(
		&[
			b"--auto-chunk",
			b"--fat",
			b"--no-checksums",
			b"--no-eject",
			b"--read-only",
		],
		&[
			b"--audio",
			b"--chunk",
			b"--counter",
			b"--dev",
			b"--dual-layer",
			b"--force",
			b"--out",
			b"--wav-channels",
			b"-d",
			b"-o",
		],
	) {
		return Err(RipError::CliArg(String::from_utf8_lossy(boo).into_owned()));
	}

	// Source drives, comma-separated. Two or more get striped.
	let devs = args.option2(b"-d", b"--dev")
		.and_then(|v| std::str::from_utf8(v).ok())
		.ok_or(RipError::CliParse("-d/--dev"))?;
	let mut drives: Vec<Box<dyn DiscSource + Send>> = Vec::new();
	let mut dev_names: Vec<String> = Vec::new();
	for dev in devs.split(',').map(str::trim).filter(|v| ! v.is_empty()) {
		drives.push(Box::new(UsbMassStorage::open(dev)?));
		dev_names.push(dev.to_owned());
	}
	let mut src = DriveStriper::new(drives)?;

	// The rest of the options.
	let opts = parse_options(&args)?;
	let force = args.option(b"--force").map(parse_force).transpose()?;
	let counter = args.option(b"--counter")
		.map_or(Some(0), u32::btou)
		.ok_or(RipError::CliParse("--counter"))?;

	// Size up the disc.
	let profile = DiscProfile::detect(&mut src, &opts, force, counter).map_err(|e|
		if matches!(e, RipError::UnknownDisc) {
			Msg::warning("Failed to detect the disc type; try again with --force.").eprint();
			e
		}
		else { e }
	)?;

	// Destination.
	let read_only = args.switch(b"--read-only");
	let dst =
		if read_only { None }
		else {
			Some(args.option2_os(b"-o", b"--out").map_or_else(
				|| PathBuf::from("."),
				PathBuf::from,
			))
		};
	let fs_size_bits = args.switch(b"--fat").then_some(33);

	// Show the plan and give one last chance to bail.
	summarize(&profile, &opts, &dev_names, dst.as_deref());
	if ! Msg::plain("\x1b[1;38;5;43mStart the dump?\x1b[0m").eprompt_with_default(true) {
		eprintln!();
		return Err(RipError::Cancelled);
	}
	eprintln!();

	// Progress, CTRL-C, events.
	let progress = Progless::default();
	let _res = progress.try_reset(100);
	let killed = KillSwitch::default();
	sigint(killed.inner(), Some(progress.clone()));
	let mut events = CliEvents {
		progress: progress.clone(),
		done: 0,
	};

	// Databases are someone else's department; without them verification
	// simply reports "not available".
	let verifier = Verifier::default();

	// Rip and report!
	let mut session = RipSession::new(src, profile, opts, dst, fs_size_bits);
	let outcome = session.rip(&mut events, &verifier, &killed)?;
	progress.finish();
	report(&outcome, &opts);

	if killed.killed() { Err(RipError::Cancelled) }
	else { Ok(()) }
}



/// # CLI Event Sink.
///
/// Renders the session's progress ticks onto a `Progless` bar and fields
/// its two questions.
struct CliEvents {
	/// # Progress Bar.
	progress: Progless,

	/// # Percent Already Credited.
	done: u8,
}

impl RipEvents for CliEvents {
	fn datel_key(&mut self, crc100000: u32, known: bool) {
		let _res = self.progress.push_msg(
			Msg::custom(
				"Datel",
				199,
				&format!(
					"{} CRC100000={crc100000:08X}",
					if known { "Known" } else { "Unknown" },
				),
			)
				.with_newline(true)
		);
	}

	fn new_device(&mut self, chunk: u32) -> bool {
		Msg::plain(format!("Insert a device for chunk #{chunk}, then confirm."))
			.eprompt_with_default(true)
	}

	fn progress(&mut self, report: &ProgressReport) {
		if self.done < report.percent {
			self.progress.increment_n(u32::from(report.percent - self.done));
			self.done = report.percent;
		}

		let eta = report.eta_secs;
		self.progress.set_title(Some(Msg::custom("Ripping", 199, &format!(
			"{} \x1b[2m·\x1b[0m {}/{} MiB \x1b[2m·\x1b[0m {} KiB/s \x1b[2m·\x1b[0m ETA {:02}:{:02}:{:02}{}",
			report.kind,
			NiceU64::from(report.mb_done),
			NiceU64::from(report.mb_total),
			NiceU64::from(report.bytes_per_sec >> 10),
			eta / 3600,
			(eta / 60) % 60,
			eta % 60,
			if report.checksums { "" } else { " \x1b[2m(CRC only)\x1b[0m" },
		))));
	}
}



/// # Pre-Rip Summary.
fn summarize(
	profile: &DiscProfile,
	opts: &RipOptions,
	devs: &[String],
	dst: Option<&std::path::Path>,
) {
	use oxford_join::OxfordJoin;

	let nice_source = devs.oxford_and().into_owned();
	let nice_size = Cow::Owned(format!(
		"{} MiB ({} sectors of {})",
		NiceU64::from(profile.total_bytes() >> 20),
		NiceU64::from(u64::from(profile.end_lba())),
		profile.sector_size(),
	));
	let nice_dst = dst.map_or(
		Cow::Borrowed("Read Only \x1b[0;2m(nothing will be written)"),
		|d| Cow::Owned(d.to_string_lossy().into_owned()),
	);
	let nice_chk = Cow::Borrowed(
		if opts.checksums() { "CRC32 + MD5 + SHA-1" }
		else { "CRC32 only" }
	);
	let nice_audio = Cow::Owned(format!(
		"{}{}",
		opts.audio().as_str(),
		if profile.is_wav(opts) {
			Cow::Owned(format!(" \x1b[0;2m({} channel(s))", opts.wav_channels()))
		}
		else { Cow::Borrowed("") },
	));

	let set = [
		("Disc:", Cow::Owned(profile.to_string()), true),
		("Source:", Cow::Owned(nice_source), true),
		("Size:", nice_size, true),
		("Chunks:", Cow::Borrowed(opts.chunk_size().as_str()), true),
		("Audio:", nice_audio, profile.is_audio()),
		("Checksums:", nice_chk, true),
		("Destination:", nice_dst, true),
	];
	let max_label = set.iter().map(|(k, _, _)| k.len()).max().unwrap_or(0);

	eprintln!("\x1b[1;38;5;43mDiscRip…\x1b[0m");
	for (k, v, enabled) in set {
		if enabled {
			eprintln!("  {k:max_label$} \x1b[1m{v}\x1b[0m");
		}
	}
}

/// # Post-Rip Report.
fn report(outcome: &RipOutcome, opts: &RipOptions) {
	use oxford_join::OxfordJoin;

	Msg::custom("Ripped", 43, &format!(
		"{} in {} minute(s), {} second(s).",
		outcome.name,
		outcome.seconds / 60,
		outcome.seconds % 60,
	))
		.with_newline(true)
		.eprint();

	// Checksums.
	eprintln!("  CRC32:  {:08X}", outcome.digests.crc32);
	if let Some(md5) = outcome.digests.md5.as_deref() { eprintln!("  MD5:    {md5}"); }
	if let Some(sha1) = outcome.digests.sha1.as_deref() { eprintln!("  SHA-1:  {sha1}"); }

	// Verification.
	Msg::custom("Verify", 43, &outcome.verification.to_string())
		.with_newline(true)
		.eprint();

	// Losses, if any.
	if outcome.bad_sectors != 0 {
		Msg::warning(format!(
			"{} sector(s) were unrecoverable and have been zero-filled; see the manifest.",
			NiceU64::from(outcome.bad_sectors),
		)).eprint();
	}

	// The fruits of your labor.
	if 1 < outcome.parts {
		let files: Vec<String> = (0..outcome.parts)
			.map(|i| format!("{}.part{i}", outcome.name))
			.collect();
		eprintln!("  \x1b[2m{}\x1b[0m", files.oxford_and());
	}

	// Option context for skimmers: chunked dumps need rejoining.
	if 1 < outcome.parts && opts.chunk_size() != ChunkSize::Max {
		eprintln!("  \x1b[2mConcatenate the parts in order to rebuild the image.\x1b[0m");
	}

	eprintln!();
}

/// # Parse Rip Options.
fn parse_options(args: &Argue) -> Result<RipOptions, RipError> {
	let mut opts = RipOptions::default()
		.with_checksums(! args.switch(b"--no-checksums"))
		.with_eject(! args.switch(b"--no-eject"));

	if args.switch(b"--auto-chunk") {
		opts = opts.with_new_device(NewDevice::Auto);
	}

	if let Some(v) = args.option(b"--dual-layer") {
		opts = opts.with_dual_layer(match v.to_ascii_lowercase().as_slice() {
			b"auto" => DualLayer::Auto,
			b"mini" | b"1.4" => DualLayer::Mini,
			b"single" | b"4.4" => DualLayer::Single,
			b"dual" | b"8" => DualLayer::Dual,
			_ => return Err(RipError::CliParse("--dual-layer")),
		});
	}

	if let Some(v) = args.option(b"--chunk") {
		opts = opts.with_chunk_size(match v.to_ascii_lowercase().as_slice() {
			b"1" | b"1g" | b"1gb" => ChunkSize::One,
			b"2" | b"2g" | b"2gb" => ChunkSize::Two,
			b"3" | b"3g" | b"3gb" => ChunkSize::Three,
			b"max" => ChunkSize::Max,
			_ => return Err(RipError::CliParse("--chunk")),
		});
	}

	if let Some(v) = args.option(b"--audio") {
		opts = opts.with_audio(match v.to_ascii_lowercase().as_slice() {
			b"bin" => AudioOutput::Bin,
			b"wav" => AudioOutput::Wav,
			b"wav-fast" | b"fast" => AudioOutput::WavFast,
			b"wav-best" | b"best" => AudioOutput::WavBest,
			_ => return Err(RipError::CliParse("--audio")),
		});
	}

	if let Some(v) = args.option(b"--wav-channels") {
		let v = u16::btou(v.trim_ascii()).ok_or(RipError::CliParse("--wav-channels"))?;
		opts = opts.with_wav_channels(v);
	}

	Ok(opts)
}

/// # Parse a Forced Type.
fn parse_force(raw: &[u8]) -> Result<ForceKind, RipError> {
	match raw.to_ascii_lowercase().as_slice() {
		b"gamecube" | b"gc" | b"ngc" => Ok(ForceKind::GameCube),
		b"wii" => Ok(ForceKind::Wii),
		b"datel" => Ok(ForceKind::Datel),
		b"dvd-sl" | b"dvd" => Ok(ForceKind::DvdVideoSl),
		b"dvd-dl" => Ok(ForceKind::DvdVideoDl),
		b"mini-dvd" | b"minidvd" => Ok(ForceKind::MiniDvd),
		b"audio" | b"audio-cd" | b"cd" => Ok(ForceKind::AudioCd),
		_ => Err(RipError::CliParse("--force")),
	}
}

/// # Exit Code for an Error.
///
/// Write failures are `1`, terminal read problems `2`, total audio loss
/// `3`; everything else (setup problems, bad arguments) also exits `1`.
const fn exit_code(err: &RipError) -> i32 {
	match err {
		RipError::DiscRead(_) | RipError::NoMedium | RipError::Toc => 2,
		RipError::AllAudioBlocksFailed => 3,
		_ => 1,
	}
}

/// # Hook Up CTRL+C.
fn sigint(killed: Arc<AtomicBool>, progress: Option<Progless>) {
	let _res = ctrlc::set_handler(move ||
		if killed.compare_exchange(false, true, SeqCst, Relaxed).is_ok() {
			if let Some(p) = &progress { p.sigint(); }
		}
	);
}

#[cold]
/// # Print Help.
fn helper() {
	println!(concat!(
		r"
   .-------.
  /   o     \    ", "\x1b[38;5;43mDiscRip\x1b[0;38;5;69m v", env!("CARGO_PKG_VERSION"), "\x1b[0m", r#"
 |    ( )    |   Faithful, verifiable dumps of
  \     o   /    GameCube/Wii discs and friends.
   '-------'

USAGE:
    discrip -d <DEV> [OPTIONS]

SOURCE:
    -d, --dev <PATH(s)>
                      Source block device(s) or image file(s). Separate
                      multiple paths with commas to stripe reads across
                      drives on 1 MiB boundaries.
        --force <TYPE>
                      Skip/override detection: gamecube, wii, datel,
                      dvd-sl, dvd-dl, mini-dvd, or audio.
        --dual-layer <SIZE>
                      Wii dump size: auto, 1.4, 4.4, or 8.
                      [default: auto]

DESTINATION:
    -o, --out <DIR>   Destination directory. [default: .]
        --chunk <SIZE>
                      Split the image into parts: 1, 2, 3 (GiB), or max.
                      [default: max]
        --auto-chunk  Keep writing between chunks instead of prompting
                      for a new device.
        --fat         The destination is FAT-formatted; cap parts just
                      shy of 4 GiB.
        --read-only   Read and checksum the disc without writing
                      anything.

AUDIO CDs:
        --audio <MODE>
                      bin, wav, wav-fast, or wav-best. [default: bin]
        --wav-channels <NUM>
                      WAV channel count, 1-8. [default: 2]

MISCELLANEOUS:
        --counter <NUM>
                      Seed for fallback disc<N> names. [default: 0]
        --no-checksums
                      Skip MD5/SHA-1 (CRC32 is always computed). Dumps
                      without full checksums cannot be verified against
                      Redump.
        --no-eject    Leave the disc loaded when the dump completes.
    -h, --help        Print help information to STDOUT and exit.
    -V, --version     Print version information to STDOUT and exit.

EARLY EXIT:
    Press "#, "\x1b[38;5;208mCTRL\x1b[0m+\x1b[38;5;208mC\x1b[0m", r" to cancel a rip in progress. The partial file is
    kept, but its digests are not finalized.
"
	));
}
