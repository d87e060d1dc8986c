/// Opening a browser is a best-effort convenience; nothing in the serve
/// path may depend on whether it worked.
pub(crate) trait Browser {
    fn open(&self, url: &str);
}

/// Hands the URL to the host's default browser.
pub(crate) struct SystemBrowser;

impl Browser for SystemBrowser {
    fn open(&self, url: &str) {
        match open::that(url) {
            Ok(()) => log::info!("Please check your browser!"),
            Err(why) => log::debug!("failed to launch a browser: {why}"),
        }
    }
}

/// Opens nothing.
#[cfg(test)]
pub(crate) struct NoBrowser;

#[cfg(test)]
impl Browser for NoBrowser {
    fn open(&self, _url: &str) {}
}
