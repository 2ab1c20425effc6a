/*!
# DiscRip: Writer Task
*/

use crate::{
	QUEUE_DEPTH,
	ReadBlock,
	RipError,
};
use std::{
	fs::File,
	io::Write,
	sync::mpsc::{
		Receiver,
		SyncSender,
		sync_channel,
	},
	thread::JoinHandle,
};



/// # Writer Command.
///
/// The rip loop never touches the output file; it drives this task
/// through a bounded FIFO inbox instead, so writes land in exactly the
/// order blocks were submitted.
pub(crate) enum WriterCommand {
	/// # Swap the Output File.
	///
	/// The previous handle, if any, is flushed and closed by the swap.
	SetFile(File),

	/// # Write a Block.
	///
	/// The block's buffer returns to the free queue once written (or
	/// immediately when no file is set, i.e. the read-only verification
	/// mode).
	Write(ReadBlock),

	/// # Flush Marker.
	///
	/// Replies once every previously-queued `Write` has been issued; used
	/// to order file swaps across chunk boundaries.
	Flush(SyncSender<()>),

	/// # Finish Up.
	Shutdown,
}



/// # Writer Task.
///
/// A dedicated writer thread owning the current output file handle. Write
/// failures are reported on a separate feedback channel, never silently
/// swallowed, after which the thread exits and takes any queued blocks
/// with it; the orchestrator notices the free queue running dry and
/// aborts.
pub(crate) struct WriterTask {
	/// # Command Inbox.
	cmd: SyncSender<WriterCommand>,

	/// # Thread Handle.
	handle: JoinHandle<()>,
}

impl WriterTask {
	/// # Spawn.
	///
	/// Written-out blocks are returned through `free`; failures surface on
	/// the returned feedback receiver.
	pub(crate) fn spawn(free: SyncSender<ReadBlock>) -> (Self, Receiver<RipError>) {
		let (cmd_tx, cmd_rx) = sync_channel::<WriterCommand>(QUEUE_DEPTH);
		let (fail_tx, fail_rx) = sync_channel::<RipError>(1);

		let handle = std::thread::spawn(move || writer_loop(&cmd_rx, &free, &fail_tx));

		(
			Self { cmd: cmd_tx, handle },
			fail_rx,
		)
	}

	/// # Send a Command.
	///
	/// ## Errors
	///
	/// Fails only when the writer has already exited (i.e. after a write
	/// failure); the actual cause will be waiting on the feedback channel.
	pub(crate) fn send(&self, cmd: WriterCommand) -> Result<(), RipError> {
		self.cmd.send(cmd).map_err(|_| RipError::Bug("The writer died early"))
	}

	/// # Shut Down and Join.
	pub(crate) fn finish(self) {
		// Both sends can only fail if the thread is already gone, which is
		// exactly what we're after anyway.
		let _res = self.cmd.send(WriterCommand::Shutdown);
		drop(self.cmd);
		let _res = self.handle.join();
	}
}



/// # The Writer Loop.
///
/// Commands arrive strictly in submission order. A short write posts the
/// failure and bails; everything else keeps the loop alive until
/// `Shutdown` (or channel teardown).
fn writer_loop(
	cmd: &Receiver<WriterCommand>,
	free: &SyncSender<ReadBlock>,
	fail: &SyncSender<RipError>,
) {
	let mut fp: Option<File> = None;

	while let Ok(msg) = cmd.recv() {
		match msg {
			WriterCommand::SetFile(new) => {
				if let Some(mut old) = fp.replace(new) { let _res = old.flush(); }
			},
			WriterCommand::Write(block) => {
				if let Some(f) = fp.as_mut() {
					if let Err(e) = f.write_all(block.bytes()) {
						let _res = fail.send(RipError::Write(e.to_string()));
						return;
					}
				}

				// Hand the buffer back for reuse. If the other end has
				// already hung up the session is over anyway.
				if free.send(block).is_err() { return; }
			},
			WriterCommand::Flush(reply) => { let _res = reply.send(()); },
			WriterCommand::Shutdown => break,
		}
	}

	if let Some(mut f) = fp { let _res = f.flush(); }
}
