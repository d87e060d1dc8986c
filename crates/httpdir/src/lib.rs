//! > An HTTP static file server
//!
//! `httpdir` serves a directory tree over plain HTTP to augment the
//! development loop of a site.  It prioritizes small size and compile
//! times over speed, scalability, or hardening, but it never serves
//! content from outside the hosted directory: parent-directory request
//! segments are rejected rather than resolved.
//!
//! # Example
//!
//! ```rust,no_run
//! let path = std::env::current_dir().unwrap();
//! let server = httpdir::Server::new(&path);
//!
//! println!("Serving {}", path.display());
//! println!("See http://{}", server.addr());
//! println!("Hit CTRL-C to stop");
//!
//! server.serve().unwrap();
//! ```

mod files;

use std::{
    str::FromStr,
    sync::{RwLock, TryLockError},
};

use files::Resolved;

/// Custom server settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerBuilder {
    source: std::path::PathBuf,
    hostname: Option<String>,
    port: Option<u16>,
}

impl ServerBuilder {
    pub fn new(source: impl Into<std::path::PathBuf>) -> Self {
        Self {
            source: source.into(),
            hostname: None,
            port: None,
        }
    }

    /// Override the hostname
    ///
    /// Use `0.0.0.0` to accept connections from other machines.
    pub fn hostname(&mut self, hostname: impl Into<String>) -> &mut Self {
        self.hostname = Some(hostname.into());
        self
    }

    /// Override the port
    ///
    /// By default, the first available port is selected.
    pub fn port(&mut self, port: u16) -> &mut Self {
        self.port = Some(port);
        self
    }

    /// Create a server
    ///
    /// This is needed for accessing the dynamically assigned port
    pub fn build(&self) -> Server {
        let source = self.source.clone();
        let hostname = self.hostname.as_deref().unwrap_or("localhost");
        let port = self
            .port
            .or_else(|| get_available_port(hostname))
            // Just have `serve` error out
            .unwrap_or(3000);

        Server {
            source,
            addr: format!("{hostname}:{port}"),
            server: RwLock::new(None),
        }
    }

    /// Start the webserver
    pub fn serve(&self) -> Result<(), Error> {
        self.build().serve()
    }
}

pub struct Server {
    source: std::path::PathBuf,
    addr: String,
    server: RwLock<Option<tiny_http::Server>>,
}

impl Server {
    /// Serve on first available port on localhost
    pub fn new(source: impl Into<std::path::PathBuf>) -> Self {
        ServerBuilder::new(source).build()
    }

    /// The location being served
    pub fn source(&self) -> &std::path::Path {
        self.source.as_path()
    }

    /// The address the server is available at
    ///
    /// This is useful for telling users how to access the served up files since the port is
    /// dynamically assigned by default.
    pub fn addr(&self) -> &str {
        self.addr.as_str()
    }

    /// Whether the server was running at the instant the call happened
    pub fn is_running(&self) -> bool {
        matches!(self.server.read().as_deref(), Ok(Some(_)))
    }

    /// Start the webserver
    ///
    /// Blocks until [`Server::close`] unblocks the accept loop.  The
    /// listener slot is cleared on the way out, releasing the port even
    /// when the loop ends early.
    pub fn serve(&self) -> Result<(), Error> {
        match self.server.try_write().as_deref_mut() {
            Ok(server @ None) => {
                *server = Some(tiny_http::Server::http(self.addr()).map_err(Error::new)?);
            }
            Ok(Some(_)) | Err(TryLockError::WouldBlock) => {
                return Err(Error::new("the server is running"));
            }
            Err(error @ TryLockError::Poisoned(_)) => return Err(Error::new(error)),
        }

        {
            let server = self.server.read().map_err(Error::new)?;
            // unwrap is safe here
            for request in server.as_ref().unwrap().incoming_requests() {
                if let Err(e) = static_file_handler(self.source(), request) {
                    log::error!("{e}");
                }
            }
        }

        *self.server.write().map_err(Error::new)? = None;

        Ok(())
    }

    /// Closes the server gracefully
    ///
    /// Callable from any thread, including an interrupt handler.
    pub fn close(&self) {
        if let Ok(Some(server)) = self.server.read().as_deref() {
            server.unblock();
        }
    }
}

/// Serve Error
#[derive(Debug)]
pub struct Error {
    message: String,
}

impl Error {
    fn new(message: impl ToString) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.message.fmt(fmt)
    }
}

impl std::error::Error for Error {}

fn static_file_handler(root: &std::path::Path, req: tiny_http::Request) -> Result<(), Error> {
    // grab the requested path, stripping off any querystring (often
    // used for cachebusting) so resolution only sees the path
    let mut target = req.url().to_owned();
    if let Some(position) = target.rfind('?') {
        target.truncate(position);
    }

    let resolved = files::resolve(root, &target);
    log::debug!("{} {} -> {}", req.method(), req.url(), resolved.status());

    match resolved {
        Resolved::File(path) => {
            let file = std::fs::File::open(&path).map_err(Error::new)?;
            let mut response = tiny_http::Response::from_file(file);
            if let Some(mime) = mime_guess::MimeGuess::from_path(&path).first_raw() {
                response.add_header(header("Content-Type", mime));
            }
            req.respond(response).map_err(Error::new)
        }
        Resolved::Listing(path) => {
            let page = files::listing(&path, &target).map_err(Error::new)?;
            req.respond(
                tiny_http::Response::from_string(page)
                    .with_header(header("Content-Type", "text/html; charset=utf-8")),
            )
            .map_err(Error::new)
        }
        Resolved::Redirect(location) => req
            .respond(
                tiny_http::Response::from_string("")
                    .with_status_code(301)
                    .with_header(header("Location", &location)),
            )
            .map_err(Error::new),
        Resolved::Forbidden => req
            .respond(
                tiny_http::Response::from_string("<h1> <center> 403: Forbidden </center> </h1>")
                    .with_status_code(403)
                    .with_header(header("Content-Type", "text/html")),
            )
            .map_err(Error::new),
        Resolved::NotFound => req
            .respond(
                tiny_http::Response::from_string(
                    "<h1> <center> 404: Page not found </center> </h1>",
                )
                .with_status_code(404)
                .with_header(header("Content-Type", "text/html")),
            )
            .map_err(Error::new),
    }
}

fn header(name: &str, value: &str) -> tiny_http::Header {
    tiny_http::Header::from_str(&format!("{name}: {value}")).expect("formatted correctly")
}

fn get_available_port(host: &str) -> Option<u16> {
    // Start after "well-known" ports (0-1023) as they require superuser
    // privileges on UNIX-like operating systems.
    (1024..9000).find(|port| port_is_available(host, *port))
}

fn port_is_available(host: &str, port: u16) -> bool {
    std::net::TcpListener::bind((host, port)).is_ok()
}
