use std::io::Write;
use std::process::{Command, Output};

use serde::{Deserialize, Serialize};

/// The envelope format version written as the fixed prefix byte of every
/// on-disk entry ("Cache directory layout"). Bumped whenever the
/// serialized shape below changes incompatibly.
const ENVELOPE_VERSION: u8 = 1;

/// One cached action's recorded output ("Storage"): raw stdout and
/// stderr bytes, plus the process exit code.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Captured standard output, byte-for-byte, including any trailing (or
    /// missing) newline and ANSI escape sequences -- replay must reproduce
    /// it verbatim ("Hit semantics").
    pub stdout: Vec<u8>,
    /// Captured standard error, byte-for-byte.
    pub stderr: Vec<u8>,
    /// The process's exit code.
    pub exit_code: i32,
}

impl CacheEntry {
    /// Run `command` to completion, capturing its stdout/stderr/exit code
    /// into a `CacheEntry` ("A miss runs the underlying action,
    /// capturing output"). Returns `Err` only when the process itself could
    /// not be spawned or waited on -- a nonzero exit from the action is a
    /// normal, cacheable result, not an error here.
    pub fn capture(command: &mut Command) -> std::io::Result<CacheEntry> {
        let output: Output = command.output()?;
        Ok(CacheEntry {
            stdout: output.stdout,
            stderr: output.stderr,
            exit_code: output.status.code().unwrap_or(1),
        })
    }

    /// Replay this entry's output verbatim to the given writers and return
    /// its stored exit code, framed by the "cached results" banner when
    /// `framed` is true ("A hit banner frames the replay."). Writes the
    /// captured bytes as-is -- no line splitting, no newline inserted or
    /// removed -- so a process whose output didn't end in a newline
    /// replays exactly as it was captured.
    pub fn replay(&self, framed: bool, mut stdout: impl Write, mut stderr: impl Write) -> i32 {
        if framed {
            let _ = writeln!(stderr, "(cached results)");
        }
        let _ = stdout.write_all(&self.stdout);
        let _ = stderr.write_all(&self.stderr);
        self.exit_code
    }

    /// Serialize to the on-disk envelope: a version byte followed by the
    /// JSON body.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = vec![ENVELOPE_VERSION];
        // Infallible: `CacheEntry` contains nothing that can fail to
        // serialize (no maps with non-string keys, no floats).
        buf.extend(serde_json::to_vec(self).expect("CacheEntry always serializes"));
        buf
    }

    /// Deserialize from the on-disk envelope. Returns `None` for an unknown
    /// version byte or malformed body -- both are treated as a cache miss
    /// by the caller ("downstream readers must reject unknown
    /// versions and treat them as misses.").
    pub fn decode(bytes: &[u8]) -> Option<CacheEntry> {
        let (version, body) = bytes.split_first()?;
        if *version != ENVELOPE_VERSION {
            return None;
        }
        serde_json::from_slice(body).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_envelope() {
        let entry = CacheEntry {
            stdout: b"ok\n\x1b[32mpass\x1b[0m\n".to_vec(),
            stderr: Vec::new(),
            exit_code: 0,
        };
        let bytes = entry.encode();
        assert_eq!(CacheEntry::decode(&bytes), Some(entry));
    }

    #[test]
    fn replay_does_not_add_a_missing_trailing_newline() {
        let entry = CacheEntry { stdout: b"no trailing newline".to_vec(), stderr: Vec::new(), exit_code: 0 };
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        entry.replay(false, &mut stdout, &mut stderr);
        assert_eq!(stdout, b"no trailing newline");
    }

    #[test]
    fn unknown_version_byte_decodes_to_none() {
        let mut bytes = CacheEntry::default().encode();
        bytes[0] = 0xff;
        assert_eq!(CacheEntry::decode(&bytes), None);
    }

    #[test]
    fn truncated_body_decodes_to_none() {
        assert_eq!(CacheEntry::decode(&[ENVELOPE_VERSION]), None);
        assert_eq!(CacheEntry::decode(&[]), None);
    }
}
