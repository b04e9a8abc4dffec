//! The submission session object.
//!
//! A [`MossClient`] is built up by imperative mutation (options, base files,
//! regular files, raw in-memory entries) and then consumed by a single
//! [`MossClient::send`], which owns one TCP connection for its whole
//! lifetime. Sessions are single-threaded and not reusable across network
//! exchanges; a caller wanting retries builds a fresh client.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::language;
use crate::network::{self, Channel, Connector, MOSS_PORT, MOSS_SERVER};
use crate::protocol::{self, MossError};

/// Raw entries shorter than this are dropped at add time. Tiny submissions
/// are noise for similarity scoring, so the filter is silent rather than an
/// error.
const MIN_RAW_LEN: usize = 100;

/// Submission content supplied as an in-memory named buffer instead of a
/// filesystem path, with a per-entry language tag.
#[derive(Debug, Clone)]
struct RawEntry {
    name: String,
    text: Vec<u8>,
    lang: String,
}

/// A single-use client session for the MOSS service.
pub struct MossClient {
    user_id: String,
    server: String,
    port: u16,
    language: String,
    directory_mode: bool,
    experimental: bool,
    ignore_limit: u32,
    result_limit: u32,
    comment: String,
    base_files: Vec<PathBuf>,
    files: Vec<PathBuf>,
    raw: Vec<RawEntry>,
    connector: Option<Arc<Connector>>,
}

impl MossClient {
    /// Client pointed at the default server with the option defaults used by
    /// the upstream submission script.
    pub fn new(user_id: &str) -> Self {
        Self::with_server(user_id, MOSS_SERVER, MOSS_PORT)
    }

    /// Client pointed at a specific server and port.
    pub fn with_server(user_id: &str, server: &str, port: u16) -> Self {
        Self {
            user_id: user_id.to_string(),
            server: server.to_string(),
            port,
            language: "c".to_string(),
            directory_mode: false,
            experimental: false,
            ignore_limit: 10,
            result_limit: 250,
            comment: String::new(),
            base_files: Vec::new(),
            files: Vec::new(),
            raw: Vec::new(),
            connector: None,
        }
    }

    /// Client with an injected connector instead of the real network.
    pub fn with_connector(user_id: &str, connector: Box<Connector>) -> Self {
        let mut client = Self::new(user_id);
        client.connector = Some(Arc::from(connector));
        client
    }

    // -----------------------------------------------------------------------
    // Configuration
    // -----------------------------------------------------------------------

    /// Set the source language of the submitted files. Fails without
    /// touching the current language when the tag is not in the allow-list.
    pub fn set_language(&mut self, lang: &str) -> Result<(), MossError> {
        if !language::is_supported(lang) {
            return Err(MossError::InvalidConfiguration(format!(
                "unsupported language '{lang}'"
            )));
        }
        self.language = lang.to_string();
        Ok(())
    }

    /// Treat each submitted directory as one program (`-d` in the MOSS
    /// documentation).
    pub fn set_directory_mode(&mut self, enabled: bool) {
        self.directory_mode = enabled;
    }

    /// Route the submission to the experimental server (`-x`).
    pub fn set_experimental_server(&mut self, enabled: bool) {
        self.experimental = enabled;
    }

    /// Occurrences of a passage above this limit are ignored (`-m`).
    pub fn set_ignore_limit(&mut self, limit: u32) -> Result<(), MossError> {
        if limit <= 1 {
            return Err(MossError::InvalidConfiguration(
                "the limit needs to be greater than 1".to_string(),
            ));
        }
        self.ignore_limit = limit;
        Ok(())
    }

    /// Number of matched files shown in the result (`-n`).
    pub fn set_result_limit(&mut self, limit: u32) -> Result<(), MossError> {
        if limit <= 1 {
            return Err(MossError::InvalidConfiguration(
                "the limit needs to be greater than 1".to_string(),
            ));
        }
        self.result_limit = limit;
        Ok(())
    }

    /// Comment attached to the request, shown on the result page (`-c`).
    pub fn set_comment(&mut self, comment: &str) {
        self.comment = comment.to_string();
    }

    /// Add a base file: shared skeleton code excluded from pairwise
    /// matching (`-b`). Sent with wire id 0.
    pub fn add_base_file(&mut self, path: impl AsRef<Path>) -> Result<(), MossError> {
        let path = path.as_ref();
        ensure_readable(path)?;
        self.base_files.push(path.to_path_buf());
        Ok(())
    }

    /// Add a file to the submission. Insertion order defines wire id order.
    pub fn add_file(&mut self, path: impl AsRef<Path>) -> Result<(), MossError> {
        let path = path.as_ref();
        ensure_readable(path)?;
        self.files.push(path.to_path_buf());
        Ok(())
    }

    /// Add every file matching a shell glob pattern, in alphabetical match
    /// order.
    pub fn add_by_wildcard(&mut self, pattern: &str) -> Result<(), MossError> {
        let matches = glob::glob(pattern).map_err(|e| {
            MossError::InvalidConfiguration(format!("bad wildcard pattern '{pattern}': {e}"))
        })?;
        for entry in matches {
            let path =
                entry.map_err(|e| MossError::FileNotFound(e.path().display().to_string()))?;
            self.add_file(path)?;
        }
        Ok(())
    }

    /// Add an in-memory submission. Content shorter than 100 bytes is
    /// silently dropped.
    pub fn add_raw(&mut self, name: &str, text: impl Into<Vec<u8>>, lang: &str) {
        let text = text.into();
        if text.len() < MIN_RAW_LEN {
            return;
        }
        self.raw.push(RawEntry {
            name: name.to_string(),
            text,
            lang: lang.to_string(),
        });
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn directory_mode(&self) -> bool {
        self.directory_mode
    }

    pub fn experimental_server(&self) -> bool {
        self.experimental
    }

    pub fn ignore_limit(&self) -> u32 {
        self.ignore_limit
    }

    pub fn result_limit(&self) -> u32 {
        self.result_limit
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn base_file_count(&self) -> usize {
        self.base_files.len()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn raw_count(&self) -> usize {
        self.raw.len()
    }

    /// The language tags the server accepts.
    pub fn allowed_languages(&self) -> &'static [&'static str] {
        language::ALLOWED_LANGUAGES
    }

    // -----------------------------------------------------------------------
    // Session
    // -----------------------------------------------------------------------

    /// Perform one complete exchange with the server.
    ///
    /// Opens one connection, writes the handshake, streams every configured
    /// entry, issues the final query and returns the raw response line.
    /// `progress` receives human-readable status lines, synchronously and in
    /// order.
    ///
    /// Returns `Ok(None)` when a raw-entry write failed mid-stream: that
    /// path is reported through `progress` and deliberately never raised as
    /// an error, while handshake failures are fatal to the whole session.
    ///
    /// # Errors
    ///
    /// - [`MossError::Connection`] when the connection cannot be
    ///   established, or on a transport failure outside raw-entry streaming
    /// - [`MossError::FileNotFound`] when an added file is gone at send time
    /// - [`MossError::UnsupportedLanguage`] when the server answers `no`
    /// - [`MossError::ServerUnresponsive`] on any other non-`yes` response
    pub fn send<F>(&self, mut progress: F) -> Result<Option<String>, MossError>
    where
        F: FnMut(&str),
    {
        let mut channel = match &self.connector {
            Some(connect) => connect(&self.server, self.port)?,
            None => network::connect(&self.server, self.port)?,
        };
        let chan = &mut *channel;

        network::write_line(chan, &format!("moss {}", self.user_id))?;
        network::write_line(chan, &format!("directory {}", self.directory_mode as u8))?;
        network::write_line(chan, &format!("X {}", self.experimental as u8))?;
        network::write_line(chan, &format!("maxmatches {}", self.ignore_limit))?;
        network::write_line(chan, &format!("show {}", self.result_limit))?;
        network::write_line(chan, &format!("language {}", self.language))?;

        // A failed read counts as an empty (unresponsive) answer.
        let answer_line = network::read_line(chan).unwrap_or_default();
        let answer = answer_line.trim_end();
        progress(&format!("Initial MOSS Response: {answer}"));

        if answer == "no" {
            // The session is already failing; a lost `end` changes nothing.
            let _ = chan.write_all(b"end\n");
            return Err(MossError::UnsupportedLanguage(self.language.clone()));
        }
        if answer != "yes" {
            return Err(MossError::ServerUnresponsive);
        }

        for path in &self.base_files {
            self.upload_file(chan, path, 0)?;
        }
        let mut id: usize = 1;
        for path in &self.files {
            self.upload_file(chan, path, id)?;
            id += 1;
        }

        let mut total: usize = 0;
        let mut aborted = false;
        for entry in &self.raw {
            let line = protocol::file_line(id, &entry.lang, entry.text.len(), &entry.name);
            progress(&line);
            let framed = format!("{line}\n");
            if chan.write_all(framed.as_bytes()).is_err() || chan.write_all(&entry.text).is_err()
            {
                progress("Write to MOSS failed");
                aborted = true;
                break;
            }
            id += 1;
            total += framed.len() + entry.text.len();
            progress(&format!(" {total}"));
        }
        progress(&format!("Total: {total}"));

        if aborted {
            return Ok(None);
        }

        network::write_line(chan, &format!("query 0 {}", self.comment))?;
        let result = network::read_line(chan).unwrap_or_default();
        if protocol::is_result_url(&result) {
            progress(&format!("<a href=\"{result}\" target=\"moss\">{result}</a>"));
        } else {
            progress(&format!("Response: {result}"));
        }
        chan.write_all(b"end\n")?;

        if result.is_empty() {
            Ok(None)
        } else {
            Ok(Some(result))
        }
    }

    /// Stream one on-disk file: `file` control line, then the raw bytes.
    fn upload_file(&self, chan: &mut dyn Channel, path: &Path, id: usize) -> Result<(), MossError> {
        let contents =
            fs::read(path).map_err(|_| MossError::FileNotFound(path.display().to_string()))?;
        let line = protocol::file_line(id, &self.language, contents.len(), &path.to_string_lossy());
        network::write_line(chan, &line)?;
        chan.write_all(&contents)?;
        Ok(())
    }
}

/// Path must exist and be readable at call time, not just at send time.
fn ensure_readable(path: &Path) -> Result<(), MossError> {
    fs::File::open(path)
        .map(|_| ())
        .map_err(|_| MossError::FileNotFound(path.display().to_string()))
}
