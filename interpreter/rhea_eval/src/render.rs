//! Output sink for `render` and diagnostics.
//!
//! A process-wide target so evaluation can run against real stdio or, in
//! tests, against a capture buffer. Tests that install a buffer must run
//! serially.

use std::io::Write;
use std::sync::{Arc, OnceLock};

use parking_lot::{Mutex, RwLock};

/// Destination for rendered text.
pub trait RenderTarget: Send + Sync {
    fn out(&self, text: &str);
    fn err(&self, text: &str);
}

struct StandardTarget;

impl RenderTarget for StandardTarget {
    fn out(&self, text: &str) {
        let mut stdout = std::io::stdout();
        let _ = stdout.write_all(text.as_bytes());
        let _ = stdout.flush();
    }

    fn err(&self, text: &str) {
        let mut stderr = std::io::stderr();
        let _ = stderr.write_all(text.as_bytes());
        let _ = stderr.flush();
    }
}

/// Capture buffer for tests.
#[derive(Default)]
pub struct BufferTarget {
    out: Mutex<String>,
    err: Mutex<String>,
}

impl BufferTarget {
    pub fn new() -> Arc<Self> {
        Arc::new(BufferTarget::default())
    }

    pub fn take_out(&self) -> String {
        std::mem::take(&mut *self.out.lock())
    }

    pub fn take_err(&self) -> String {
        std::mem::take(&mut *self.err.lock())
    }
}

impl RenderTarget for BufferTarget {
    fn out(&self, text: &str) {
        self.out.lock().push_str(text);
    }

    fn err(&self, text: &str) {
        self.err.lock().push_str(text);
    }
}

fn target() -> &'static RwLock<Arc<dyn RenderTarget>> {
    static TARGET: OnceLock<RwLock<Arc<dyn RenderTarget>>> = OnceLock::new();
    TARGET.get_or_init(|| RwLock::new(Arc::new(StandardTarget)))
}

/// Swap the process render target, returning the previous one.
pub fn install_render_target(new_target: Arc<dyn RenderTarget>) -> Arc<dyn RenderTarget> {
    std::mem::replace(&mut *target().write(), new_target)
}

/// Write to the standard stream.
pub fn render(text: &str) {
    target().read().out(text);
}

/// Write to the error stream.
pub fn render_error(text: &str) {
    target().read().err(text);
}
