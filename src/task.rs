use std::thread;

use log::error;

/// Runs `work` on a worker thread and hands its result to `done` on the
/// calling thread's default main context.
pub fn spawn_blocking<T, W, D>(name: &str, work: W, done: D)
where
	T: Send + 'static,
	W: FnOnce() -> T + Send + 'static,
	D: FnOnce(T) + 'static,
{
	let (sender, receiver) = glib::MainContext::channel(glib::PRIORITY_DEFAULT);
	let spawned = thread::Builder::new()
		.name(name.to_string())
		.spawn(move || {
			// The receiver is gone when the main loop quit first.
			let _ = sender.send(work());
		});
	if let Err(e) = spawned {
		error!("Could not start {} thread: {}", name, e);
		return;
	}

	let mut done = Some(done);
	receiver.attach(Some(&glib::MainContext::ref_thread_default()), move |result| {
		if let Some(done) = done.take() {
			done(result);
		}
		glib::Continue(false)
	});
}
