//! Opening a server in the user's default browser.

use tracing::{debug, warn};

use crate::domain::Server;

/// Open `http://localhost:<port>` in the default browser.
///
/// The launcher runs on a blocking thread; failures are logged and otherwise
/// ignored.
pub async fn open_in_browser(port: u16) {
    let url = Server::listening(port).url();
    debug!(url = %url, "Opening in browser");

    let target = url.clone();
    match tokio::task::spawn_blocking(move || webbrowser::open(&target)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(url = %url, error = %e, "Failed to open browser"),
        Err(e) => warn!(url = %url, error = %e, "Browser task failed"),
    }
}
