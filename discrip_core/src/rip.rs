/*!
# DiscRip: Rip Session
*/

use crate::{
	BLOCK_COUNT,
	ChunkPlan,
	DATEL_KEY_BYTES,
	DigestPipeline,
	DiscProfile,
	DiscSource,
	DriveStriper,
	KillSwitch,
	NewDevice,
	RangeLog,
	ReadBlock,
	RecoveryController,
	RecoveryTally,
	RipError,
	RipOptions,
	sidecar,
	verify::rename_outputs,
	Verification,
	Verifier,
	WavForm,
	WriterCommand,
	WriterTask,
};
use std::{
	fs::File,
	io::{
		Seek,
		SeekFrom,
	},
	path::{
		Path,
		PathBuf,
	},
	sync::mpsc::{
		Receiver,
		sync_channel,
	},
	time::{
		Duration,
		Instant,
	},
};



/// # Progress Cadence.
const TICK: Duration = Duration::from_millis(1000);

/// # Sidecar Suffixes Renamed Along With the Image.
const SIDECAR_SUFFIXES: [&str; 4] = [".bca", ".bca.txt", ".bad", ".skp"];



/// # Session Event Sink.
///
/// The engine's only window to the outside world during a rip. Every
/// method has a do-nothing default so headless callers can opt in to
/// exactly what they care about.
pub trait RipEvents {
	/// # Datel Key Available.
	///
	/// Fires once the first mebibyte has been digested on a Datel rip.
	/// This call may block on the user; the wait is excluded from the
	/// session's elapsed-time accounting.
	fn datel_key(&mut self, crc100000: u32, known: bool) {
		let _res = (crc100000, known);
	}

	/// # New Device Wanted.
	///
	/// Fires before opening chunk `chunk` when the new-device policy is
	/// `Ask`; the motor has already been paused. Return `false` to cancel
	/// the rip. Also excluded from elapsed time.
	fn new_device(&mut self, chunk: u32) -> bool {
		let _res = chunk;
		true
	}

	/// # Progress Tick (At Most Once a Second).
	fn progress(&mut self, report: &ProgressReport) {
		let _res = report;
	}
}

/// # Silent Events.
///
/// The no-op sink, for tests and fully-scripted rips.
impl RipEvents for () {}

#[derive(Debug, Clone, Copy)]
/// # One Progress Tick.
pub struct ProgressReport {
	/// # Whole-Rip Percentage.
	pub percent: u8,

	/// # Instantaneous Rate (Bytes/Second).
	pub bytes_per_sec: u64,

	/// # Mebibytes Done.
	pub mb_done: u64,

	/// # Mebibytes Total.
	pub mb_total: u64,

	/// # Estimated Seconds Remaining.
	pub eta_secs: u64,

	/// # Disc-Type Label.
	pub kind: &'static str,

	/// # Checksums Enabled?
	pub checksums: bool,
}



#[derive(Debug, Clone)]
/// # Session Outcome.
pub struct RipOutcome {
	/// # Final Output Name.
	pub name: String,

	/// # Part Files Written (Zero for Read-Only).
	pub parts: u32,

	/// # Digests.
	pub digests: crate::DigestSummary,

	/// # Verification Result.
	pub verification: Verification,

	/// # Sectors Zero-Filled.
	pub bad_sectors: u64,

	/// # Elapsed Seconds (Prompt Waits Excluded).
	pub seconds: u64,
}



/// # Rip Session.
///
/// The orchestrator: one inserted disc, one resolved option set, one
/// destination (or none, for a read-only verification pass), driven
/// through profile → plan → acquire → finalize by [`RipSession::rip`].
pub struct RipSession {
	/// # Source Drives.
	src: DriveStriper,

	/// # Disc Profile.
	profile: DiscProfile,

	/// # Options.
	opts: RipOptions,

	/// # Destination Directory.
	dst: Option<PathBuf>,

	/// # Destination `PC_FILESIZEBITS`, When Known.
	fs_size_bits: Option<u32>,
}

impl RipSession {
	#[must_use]
	/// # New.
	///
	/// A `None` destination selects the read-only verification pass: the
	/// disc is read and digested in full, but nothing touches a disk.
	pub const fn new(
		src: DriveStriper,
		profile: DiscProfile,
		opts: RipOptions,
		dst: Option<PathBuf>,
		fs_size_bits: Option<u32>,
	) -> Self {
		Self { src, profile, opts, dst, fs_size_bits }
	}

	#[must_use]
	/// # Disc Profile.
	pub const fn profile(&self) -> &DiscProfile { &self.profile }

	/// # Rip!
	///
	/// Acquire the disc end to end: pull free blocks, read (with recovery
	/// where the profile allows it), digest, hand off to the writer, roll
	/// chunks at plan boundaries, then verify, rename, and emit sidecars.
	///
	/// ## Errors
	///
	/// Terminal failures are write errors, non-audio read errors, the
	/// all-audio-blocks-failed condition, and user cancellation
	/// ([`RipError::Cancelled`]; the partial file is kept).
	pub fn rip(
		&mut self,
		events: &mut dyn RipEvents,
		verifier: &Verifier,
		killed: &KillSwitch,
	) -> Result<RipOutcome, RipError> {
		let profile = self.profile.clone();
		let opts = self.opts;
		let dst = self.dst.clone();

		let sector_size = profile.sector_size();
		let end_lba = profile.end_lba();
		if end_lba == 0 { return Err(RipError::Bug("The disc has no sectors to rip")); }
		let read_sectors = opts.read_sectors(sector_size);
		let max_read = read_sectors * sector_size;
		let ext = profile.extension(&opts);
		let kind_str = profile.type_str();

		let plan = ChunkPlan::new(
			&profile,
			&opts,
			max_read,
			if dst.is_some() { self.fs_size_bits } else { None },
		);

		// The BCA is grabbed before the long haul; a disc that dies
		// mid-dump still leaves its fingerprint behind.
		if let Some(dir) = dst.as_deref() {
			if profile.kind().is_nintendo() {
				if let Ok(bca) = self.src.read_bca() {
					let _res = sidecar::write_bca(dir, profile.name(), &bca);
				}
			}
		}

		// WAV output needs its header form settled before the first byte
		// of audio lands.
		let wav = profile.is_wav(&opts)
			.then(|| WavForm::predict(profile.total_bytes(), opts.wav_channels()));

		// Recovery policy and its manifest.
		let recovery =
			if profile.is_audio() { Some(RecoveryController::for_audio(opts.audio())) }
			else if profile.is_datel() { Some(RecoveryController::for_datel()) }
			else { None };
		let mut bad_log = match (recovery.is_some(), dst.as_deref()) {
			(true, Some(dir)) => {
				let suffix = if profile.is_datel() { ".skp" } else { ".bad" };
				let label = if profile.is_datel() { "skipped" } else { "zero-filled" };
				Some(RangeLog::create(
					dir.join(format!("{}{suffix}", profile.name())),
					&format!("{label} ranges (start_lba,sectors)"),
				)?)
			},
			_ => None,
		};

		// Wire up the block pool and writer.
		let (free_tx, free_rx) = sync_channel::<ReadBlock>(BLOCK_COUNT);
		let (writer, fail_rx) = WriterTask::spawn(free_tx.clone());
		for block in ReadBlock::pool(max_read as usize) {
			free_tx.send(block).map_err(|_| RipError::Bug("The free queue refused its pool"))?;
		}
		drop(free_tx);

		// Open the first output file.
		if let Some(dir) = dst.as_deref() {
			let mut file = create_file(&dir.join(plan.file_name(profile.name(), ext, 0)))?;
			if let Some(form) = wav { form.write_to(&mut file, 0)?; }
			writer.send(WriterCommand::SetFile(file))?;
		}

		// The acquire loop proper.
		let mut digests = DigestPipeline::new(opts.checksums());
		let mut tally = RecoveryTally::default();
		let start = Instant::now();
		let mut excluded = Duration::ZERO;
		let mut last_tick = Instant::now();
		let mut last_lba = 0_u32;
		let mut chunk = 1_u32;
		let mut parts = 1_u32;
		let mut lba = 0_u32;
		let mut result = Ok(());

		while lba < end_lba {
			// A free block, or proof the writer died.
			let Ok(mut block) = free_rx.recv() else {
				result = Err(writer_failure(&fail_rx));
				break;
			};

			// Chunk rollover: drain the writer, swap devices if asked,
			// open the next part.
			let offset = u64::from(lba) * u64::from(sector_size);
			if let Some(dir) = dst.as_deref().filter(|_| plan.boundary(offset, chunk)) {
				let (tx, rx) = sync_channel::<()>(1);
				if writer.send(WriterCommand::Flush(tx)).is_err() || rx.recv().is_err() {
					result = Err(writer_failure(&fail_rx));
					break;
				}

				if opts.new_device() == NewDevice::Ask {
					self.src.motor_off(false);
					let wait = Instant::now();
					let go = events.new_device(chunk);
					excluded += wait.elapsed();
					if ! go {
						result = Err(RipError::Cancelled);
						break;
					}
				}

				match create_file(&dir.join(plan.file_name(profile.name(), ext, chunk))) {
					Ok(file) =>
						if writer.send(WriterCommand::SetFile(file)).is_err() {
							result = Err(writer_failure(&fail_rx));
							break;
						},
					Err(e) => {
						result = Err(e);
						break;
					},
				}
				chunk += 1;
				parts += 1;
			}

			// Read one block, recovering if the profile allows it.
			let cur_sectors = u32::min(read_sectors, end_lba - lba);
			block.reframe(lba, cur_sectors, sector_size);
			if let Some(rc) = recovery.as_ref() {
				rc.read_block(
					&mut self.src,
					&mut block,
					sector_size,
					bad_log.as_mut(),
					&mut tally,
				);
			}
			else if let Err(e) = self.src.read_spanning(block.bytes_mut(), offset) {
				result = Err(e);
				break;
			}

			// Digests update before the block reaches the writer; digest
			// order must equal LBA order.
			digests.update(block.bytes());
			if writer.send(WriterCommand::Write(block)).is_err() {
				result = Err(writer_failure(&fail_rx));
				break;
			}

			// Datel discs announce themselves one mebibyte in.
			if profile.is_datel() && digests.len() == DATEL_KEY_BYTES {
				if let Some(key) = digests.crc100000() {
					let wait = Instant::now();
					events.datel_key(key, verifier.is_known_datel(key));
					excluded += wait.elapsed();
				}
			}

			if killed.killed() {
				result = Err(RipError::Cancelled);
				break;
			}

			// Progress, once a second, with an instantaneous rate.
			let elapsed = last_tick.elapsed();
			if elapsed >= TICK {
				let done = u64::from(lba) * u64::from(sector_size);
				let rate = (u64::from(lba - last_lba) * u64::from(sector_size))
					.saturating_mul(1000) / (elapsed.as_millis().max(1) as u64);
				let remainder = (u64::from(end_lba) - u64::from(lba)) * u64::from(sector_size);
				events.progress(&ProgressReport {
					percent: (done * 100 / profile.total_bytes()) as u8,
					bytes_per_sec: rate,
					mb_done: done >> 20,
					mb_total: profile.total_bytes() >> 20,
					eta_secs: if rate == 0 { 0 } else { remainder / rate },
					kind: kind_str,
					checksums: opts.checksums(),
				});
				last_tick = Instant::now();
				last_lba = lba;
			}

			lba += cur_sectors;
		}

		// Wind the writer down before touching any file ourselves.
		writer.finish();
		drop(free_rx);

		// An all-failure audio rip is an error, not a dump of silence.
		if result.is_ok() && profile.is_audio() && tally.all_failed() {
			result = Err(RipError::AllAudioBlocksFailed);
		}

		// Patch the WAV/RF64 header with the bytes that actually landed.
		// Cancelled rips get this too; their partials stay playable.
		if matches!(result, Ok(()) | Err(RipError::Cancelled)) {
			if let (Some(form), Some(dir)) = (wav, dst.as_deref()) {
				let path = dir.join(plan.file_name(profile.name(), ext, 0));
				let _res = patch_wav_header(&path, form, u64::from(lba) * u64::from(sector_size));
			}
		}

		let _res = bad_log.map(RangeLog::finish);

		// Terminal failures and cancellation end here. Errors eject
		// Nintendo discs (per option); cancellation just stops the motor.
		if let Err(e) = result {
			if matches!(e, RipError::Cancelled) { self.src.motor_off(false); }
			else {
				self.src.motor_off(profile.kind().is_nintendo() && opts.auto_eject());
			}
			return Err(e);
		}

		// Finalize: digests, verification, renames, sidecars.
		let seconds = start.elapsed().saturating_sub(excluded).as_secs();
		let digests = digests.finish();
		let verification = verifier.verify(&profile, &digests);
		let mut final_name = profile.name().to_owned();

		if let Some(dir) = dst.as_deref() {
			if let Verification::Verified(canonical) = &verification {
				rename_outputs(
					dir,
					profile.name(),
					canonical,
					ext,
					plan.is_multi().then_some(parts),
					&SIDECAR_SUFFIXES,
				)?;
				canonical.clone_into(&mut final_name);
			}
			else if profile.is_datel() {
				// Unverified Datel dumps get a key-derived name so they
				// can be identified (and submitted) later.
				let datel_name = format!("datel_{:08x}", digests.crc100000.unwrap_or(0));
				rename_outputs(
					dir,
					profile.name(),
					&datel_name,
					ext,
					plan.is_multi().then_some(parts),
					&SIDECAR_SUFFIXES,
				)?;
				final_name = datel_name;
			}

			if profile.is_audio() {
				let _res = sidecar::write_cue(
					dir,
					&final_name,
					&format!("{final_name}{ext}"),
					profile.is_wav(&opts),
					profile.toc(),
				);
			}

			sidecar::write_dump_info(dir, &final_name, &profile, &digests, &verification, seconds)?;
		}

		self.src.motor_off(profile.kind().is_nintendo() && opts.auto_eject());

		Ok(RipOutcome {
			name: final_name,
			parts: if dst.is_some() { parts } else { 0 },
			digests,
			verification,
			bad_sectors: tally.failed,
			seconds,
		})
	}
}



/// # Create an Output File.
///
/// Stale files at the same path are removed first so short rewrites can't
/// leave old tails behind.
fn create_file(path: &Path) -> Result<File, RipError> {
	if path.exists() { let _res = std::fs::remove_file(path); }
	File::create(path).map_err(|_| RipError::Create(path.to_string_lossy().into_owned()))
}

/// # Patch the Audio Header.
fn patch_wav_header(path: &Path, form: WavForm, data_size: u64) -> Result<(), RipError> {
	let mut file = std::fs::OpenOptions::new()
		.write(true)
		.open(path)
		.map_err(|_| RipError::Write(path.to_string_lossy().into_owned()))?;
	file.seek(SeekFrom::Start(0))
		.map_err(|_| RipError::Write(path.to_string_lossy().into_owned()))?;
	form.write_to(&mut file, data_size)
}

/// # The Writer's Excuse.
///
/// When the free queue dries up, the real error is waiting on the
/// feedback channel.
fn writer_failure(fail_rx: &Receiver<RipError>) -> RipError {
	fail_rx.try_recv()
		.unwrap_or(RipError::Bug("The writer died without a word"))
}



#[cfg(test)]
mod test {
	use super::*;
	use crate::{
		AudioOutput,
		ChecksumDb,
		DiscKind,
		DiscSource,
		ForceKind,
		SourceRead,
	};

	/// # Patterned Disc With Holes.
	///
	/// Every byte equals `(offset % 251) as u8`, so the written image can
	/// be reproduced (and checked) independently. Reads overlapping a bad
	/// LBA fail outright.
	struct PatternDisc {
		bad: Vec<u32>,
		sector_size: u32,
	}

	impl SourceRead for PatternDisc {
		fn read(&mut self, dst: &mut [u8], offset: u64) -> Result<(), RipError> {
			let ss = u64::from(self.sector_size);
			let first = offset / ss;
			let last = (offset + dst.len() as u64 - 1) / ss;
			if self.bad.iter().any(|&b| u64::from(b) >= first && u64::from(b) <= last) {
				return Err(RipError::DiscRead(-1));
			}
			for (i, v) in dst.iter_mut().enumerate() {
				*v = ((offset + i as u64) % 251) as u8;
			}
			Ok(())
		}
	}

	impl DiscSource for PatternDisc {}

	/// # The Image Such a Disc Should Produce.
	fn expected_image(sectors: u32, sector_size: u32, bad: &[u32]) -> Vec<u8> {
		let ss = sector_size as usize;
		let mut out: Vec<u8> = (0..sectors as usize * ss)
			.map(|i| ((i as u64) % 251) as u8)
			.collect();
		for &b in bad {
			out[b as usize * ss..(b as usize + 1) * ss].fill(0);
		}
		out
	}

	/// # Session Over a Pattern Disc.
	fn session(
		profile: DiscProfile,
		opts: RipOptions,
		dst: Option<PathBuf>,
		bad: Vec<u32>,
	) -> RipSession {
		let sector_size = profile.sector_size();
		RipSession::new(
			DriveStriper::single(Box::new(PatternDisc { bad, sector_size })),
			profile,
			opts,
			dst,
			None,
		)
	}

	#[test]
	fn t_session_iso() {
		let dir = tempfile::tempdir().expect("Tempdir failed.");
		let profile = DiscProfile::mock(
			DiscKind::Other, Some(ForceKind::DvdVideoSl), 2048, 96, "DVDTEST",
		);
		let opts = RipOptions::default();
		let mut rip = session(profile, opts, Some(dir.path().to_path_buf()), Vec::new());

		let out = rip.rip(&mut (), &Verifier::default(), &KillSwitch::default())
			.expect("Rip failed.");

		// Byte-exactness, start to finish.
		let want = expected_image(96, 2048, &[]);
		let raw = std::fs::read(dir.path().join("DVDTEST.iso")).expect("Read failed.");
		assert_eq!(raw, want, "Image mismatch.");

		// The digests describe the same bytes, and no database means no
		// verification.
		assert_eq!(out.digests.crc32, crc32fast::hash(&want));
		assert_eq!(out.digests.bytes, want.len() as u64);
		assert_eq!(out.verification, Verification::Unavailable);
		assert_eq!(out.parts, 1);
		assert_eq!(out.bad_sectors, 0);
		assert!(out.digests.md5.is_some(), "Checksums default on.");

		// And the receipt exists.
		assert!(dir.path().join("DVDTEST-dumpinfo.txt").exists(), "Missing dump-info.");
	}

	#[test]
	fn t_session_read_only() {
		let profile = DiscProfile::mock(
			DiscKind::Other, Some(ForceKind::DvdVideoSl), 2048, 32, "RO",
		);
		let mut rip = session(profile, RipOptions::default(), None, Vec::new());

		let out = rip.rip(&mut (), &Verifier::default(), &KillSwitch::default())
			.expect("Rip failed.");

		// No destination, no files, but the digests still happen.
		assert_eq!(out.parts, 0);
		let want = expected_image(32, 2048, &[]);
		assert_eq!(out.digests.crc32, crc32fast::hash(&want));
	}

	#[test]
	fn t_session_audio_bad_sectors() {
		// Scenario: two unrecoverable sectors under Wav mode come back as
		// zeros in the output and one coalesced `.bad` range.
		let dir = tempfile::tempdir().expect("Tempdir failed.");
		let profile = DiscProfile::mock(
			DiscKind::Other, Some(ForceKind::AudioCd), 2352, 16, "CDTEST",
		);
		let opts = RipOptions::default()
			.with_audio(AudioOutput::Wav)
			.with_checksums(false);
		let mut rip = session(profile, opts, Some(dir.path().to_path_buf()), vec![10, 11]);

		let out = rip.rip(&mut (), &Verifier::default(), &KillSwitch::default())
			.expect("Rip failed.");
		assert_eq!(out.bad_sectors, 2);

		// The WAV is a 44-byte header plus the zero-patched audio.
		let raw = std::fs::read(dir.path().join("CDTEST.wav")).expect("Read failed.");
		assert_eq!(raw.len(), 44 + 16 * 2352, "Wrong file size.");
		assert_eq!(&raw[..4], b"RIFF");
		assert_eq!(
			u32::from_le_bytes([raw[40], raw[41], raw[42], raw[43]]),
			16 * 2352,
			"Final data size not patched in.",
		);
		assert_eq!(&raw[44..], expected_image(16, 2352, &[10, 11]), "Audio mismatch.");

		// The manifest names the coalesced range, and the CUE exists even
		// without a TOC.
		let bad = std::fs::read_to_string(dir.path().join("CDTEST.bad"))
			.expect("Missing bad log.");
		assert_eq!(bad, "# zero-filled ranges (start_lba,sectors)\n10,2\n");
		assert!(dir.path().join("CDTEST.cue").exists(), "Missing CUE.");
	}

	#[test]
	fn t_session_all_audio_failed() {
		let dir = tempfile::tempdir().expect("Tempdir failed.");
		let profile = DiscProfile::mock(
			DiscKind::Other, Some(ForceKind::AudioCd), 2352, 8, "DEADCD",
		);
		let opts = RipOptions::default()
			.with_audio(AudioOutput::WavFast)
			.with_checksums(false);
		let mut rip = session(
			profile,
			opts,
			Some(dir.path().to_path_buf()),
			(0..8).collect(),
		);

		assert!(
			matches!(
				rip.rip(&mut (), &Verifier::default(), &KillSwitch::default()),
				Err(RipError::AllAudioBlocksFailed),
			),
			"Total audio loss should abort.",
		);
	}

	#[test]
	fn t_session_cancelled() {
		let dir = tempfile::tempdir().expect("Tempdir failed.");
		let profile = DiscProfile::mock(
			DiscKind::Other, Some(ForceKind::DvdVideoSl), 2048, 64, "STOPME",
		);
		let mut rip = session(
			profile,
			RipOptions::default(),
			Some(dir.path().to_path_buf()),
			Vec::new(),
		);

		// Pre-killed: the loop notices on its first pass.
		let killed = KillSwitch::default();
		killed.inner().store(true, std::sync::atomic::Ordering::SeqCst);
		assert!(
			matches!(
				rip.rip(&mut (), &Verifier::default(), &killed),
				Err(RipError::Cancelled),
			),
			"Kill switch ignored.",
		);

		// The partial file stays.
		assert!(dir.path().join("STOPME.iso").exists(), "Partial discarded.");
	}

	/// # Single-Entry CRC Database.
	struct CrcDb(u32, &'static str);

	impl ChecksumDb for CrcDb {
		fn is_available(&self, _kind: DiscKind) -> bool { true }
		fn find_crc32(&self, crc: u32, _kind: DiscKind) -> Option<String> {
			(crc == self.0).then(|| self.1.to_owned())
		}
		fn find_md5(&self, _md5: &str, _kind: DiscKind) -> Option<String> { None }
	}

	#[test]
	fn t_session_verified_rename() {
		let dir = tempfile::tempdir().expect("Tempdir failed.");
		let profile = DiscProfile::mock(DiscKind::GameCube, None, 2048, 8, "G4BE01");
		let opts = RipOptions::default().with_checksums(false);

		// Seed the database with the exact CRC this rip will produce.
		let crc = crc32fast::hash(&expected_image(8, 2048, &[]));
		let verifier = Verifier::default()
			.with_redump(Box::new(CrcDb(crc, "Great Game (USA)")));

		let mut rip = session(profile, opts, Some(dir.path().to_path_buf()), Vec::new());
		let out = rip.rip(&mut (), &verifier, &KillSwitch::default())
			.expect("Rip failed.");

		assert_eq!(out.name, "Great Game (USA)");
		assert!(out.verification.is_verified());
		assert!(dir.path().join("Great Game (USA).iso").exists(), "Canonical name missing.");
		assert!(! dir.path().join("G4BE01.iso").exists(), "Original name left behind.");
		assert!(
			dir.path().join("Great Game (USA)-dumpinfo.txt").exists(),
			"Dump-info not using the canonical name.",
		);
	}

	/// # Event Recorder.
	#[derive(Default)]
	struct Recorder {
		datel: Vec<(u32, bool)>,
	}

	impl RipEvents for Recorder {
		fn datel_key(&mut self, crc100000: u32, known: bool) {
			self.datel.push((crc100000, known));
		}
	}

	#[test]
	fn t_session_datel() {
		// 512 sectors is exactly one mebibyte: the identification key
		// fires at the end of the first block, and the unverified dump
		// gets renamed after it.
		let dir = tempfile::tempdir().expect("Tempdir failed.");
		let profile = DiscProfile::mock(DiscKind::Datel, None, 2048, 512, "DATEL");
		let opts = RipOptions::default().with_checksums(false);
		let mut rip = session(
			profile,
			opts,
			Some(dir.path().to_path_buf()),
			vec![100],
		);

		let mut events = Recorder::default();
		let out = rip.rip(&mut events, &Verifier::default(), &KillSwitch::default())
			.expect("Rip failed.");

		// The key matches the first-MiB CRC, which here is the whole
		// image (zero-patched at the skipped sector).
		let want = expected_image(512, 2048, &[100]);
		let crc = crc32fast::hash(&want);
		assert_eq!(events.datel, vec![(crc, false)], "Datel key not surfaced.");

		// Unverified Datel dumps take a key-derived name, skip log
		// included.
		let datel_name = format!("datel_{crc:08x}");
		assert_eq!(out.name, datel_name);
		assert!(dir.path().join(format!("{datel_name}.iso")).exists(), "Image not renamed.");
		let skp = std::fs::read_to_string(dir.path().join(format!("{datel_name}.skp")))
			.expect("Missing skip log.");
		assert_eq!(skp, "# skipped ranges (start_lba,sectors)\n100,1\n");
		assert_eq!(
			std::fs::read(dir.path().join(format!("{datel_name}.iso"))).expect("Read failed."),
			want,
			"Image mismatch.",
		);
	}
}

