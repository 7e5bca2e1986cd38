use crate::error::{GitError, GitResult};
use crate::git::branch::{LocalBranch, RemoteBranch};
use std::ffi::OsString;

/// `for-each-ref` format used for local heads: refname, tip, upstream ref
pub const LOCAL_REF_FORMAT: &str = "--format=%(refname)%00%(objectname)%00%(upstream)";

/// `for-each-ref` format used for remote-tracking refs: refname, tip
pub const REMOTE_REF_FORMAT: &str = "--format=%(refname)%00%(objectname)";

const HEADS_PREFIX: &str = "refs/heads/";
const REMOTES_PREFIX: &str = "refs/remotes/";

/// Parse `git status --porcelain=v2 -z` output.
///
/// Works on raw bytes: git prints paths exactly as stored, which need not
/// be UTF-8.
pub fn parse_status_porcelain_v2(output: &[u8]) -> GitResult<Vec<StatusEntry>> {
    let mut entries = Vec::new();
    let mut records = output.split(|&b| b == 0);

    while let Some(record) = records.next() {
        let Some((&kind, rest)) = record.split_first() else {
            continue;
        };
        let fields = rest.strip_prefix(b" ").unwrap_or(rest);

        match kind {
            // 1 <XY> <sub> <mH> <mI> <mW> <hH> <hI> <path>
            b'1' => entries.push(tracked_entry(fields, 7, record)?),
            // 2 <XY> <sub> <mH> <mI> <mW> <hH> <hI> <X><score> <path>\0<origPath>
            b'2' => {
                entries.push(tracked_entry(fields, 8, record)?);
                records.next();
            }
            // u <XY> <sub> <m1> <m2> <m3> <mW> <h1> <h2> <h3> <path>
            b'u' => entries.push(StatusEntry {
                status: FileStatus::Unmerged,
                path: nth_field_rest(fields, 9, record)?,
                staged: false,
                unstaged: true,
            }),
            // ? <path>; may start with a space itself
            b'?' if !fields.is_empty() => entries.push(StatusEntry {
                status: FileStatus::Untracked,
                path: path_from_bytes(fields),
                staged: false,
                unstaged: false,
            }),
            // headers (#) and ignored entries (!)
            _ => {}
        }
    }

    Ok(entries)
}

fn tracked_entry(fields: &[u8], fields_before_path: usize, record: &[u8]) -> GitResult<StatusEntry> {
    let xy = fields
        .split(|&b| b == b' ')
        .next()
        .filter(|xy| xy.len() == 2)
        .ok_or_else(|| malformed(record))?;
    let path = nth_field_rest(fields, fields_before_path, record)?;

    let status = match xy {
        b"M." | b".M" | b"MM" => FileStatus::Modified,
        b"A." | b".A" | b"AM" => FileStatus::Added,
        b"D." | b".D" => FileStatus::Deleted,
        [b'R' | b'C', _] => FileStatus::Renamed,
        _ => FileStatus::Unknown,
    };

    Ok(StatusEntry {
        status,
        path,
        staged: xy[0] != b'.',
        unstaged: xy[1] != b'.',
    })
}

/// Everything after the first `n` space-separated fields; paths may
/// themselves contain spaces.
fn nth_field_rest(fields: &[u8], n: usize, record: &[u8]) -> GitResult<OsString> {
    fields
        .splitn(n + 1, |&b| b == b' ')
        .nth(n)
        .filter(|path| !path.is_empty())
        .map(path_from_bytes)
        .ok_or_else(|| malformed(record))
}

fn malformed(record: &[u8]) -> GitError {
    GitError::ParseError(format!(
        "Malformed status record: {}",
        String::from_utf8_lossy(record)
    ))
}

#[cfg(unix)]
fn path_from_bytes(bytes: &[u8]) -> OsString {
    use std::os::unix::ffi::OsStrExt;
    std::ffi::OsStr::from_bytes(bytes).to_os_string()
}

// Git for Windows always prints UTF-8
#[cfg(not(unix))]
fn path_from_bytes(bytes: &[u8]) -> OsString {
    OsString::from(String::from_utf8_lossy(bytes).into_owned())
}

/// Parse `git for-each-ref` output produced with [`LOCAL_REF_FORMAT`]
pub fn parse_local_refs(output: &str) -> GitResult<Vec<LocalBranch>> {
    let mut branches = Vec::new();

    for line in output.lines() {
        if line.is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split('\0').collect();
        if fields.len() != 3 {
            return Err(GitError::ParseError(format!("Malformed ref line: {:?}", line)));
        }

        let name = fields[0].strip_prefix(HEADS_PREFIX).ok_or_else(|| {
            GitError::ParseError(format!("Not a local branch ref: {}", fields[0]))
        })?;
        let upstream = match fields[2] {
            "" => None,
            full => Some(full.strip_prefix(REMOTES_PREFIX).unwrap_or(full).to_string()),
        };

        branches.push(LocalBranch {
            name: name.to_string(),
            commit: fields[1].to_string(),
            upstream,
        });
    }

    Ok(branches)
}

/// Parse `git for-each-ref refs/remotes/<remote>/` output produced with
/// [`REMOTE_REF_FORMAT`]. The `<remote>/` prefix is stripped and the
/// symbolic `HEAD` ref is skipped.
pub fn parse_remote_refs(output: &str, remote: &str) -> GitResult<Vec<RemoteBranch>> {
    let prefix = format!("{}{}/", REMOTES_PREFIX, remote);
    let mut branches = Vec::new();

    for line in output.lines() {
        if line.is_empty() {
            continue;
        }

        let (refname, commit) = line
            .split_once('\0')
            .ok_or_else(|| GitError::ParseError(format!("Malformed ref line: {:?}", line)))?;

        let Some(name) = refname.strip_prefix(&prefix) else {
            continue;
        };
        if name == "HEAD" {
            continue;
        }

        branches.push(RemoteBranch {
            remote: remote.to_string(),
            name: name.to_string(),
            commit: commit.to_string(),
        });
    }

    Ok(branches)
}

/// Represents a file status entry from git status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    pub status: FileStatus,
    /// Repository-relative path, byte-for-byte as git printed it
    pub path: OsString,
    pub staged: bool,
    pub unstaged: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    Modified,
    Added,
    Deleted,
    Renamed,
    Unmerged,
    Untracked,
    Unknown,
}
