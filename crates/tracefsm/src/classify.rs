//! Call-name classification tables.
//!
//! The builder never decides what counts as a libc function or which
//! probe number a call maps to; it is handed these tables as plain
//! values. The built-in tables cover the common libc surface; a full
//! table can be loaded from an `nm -D libc.so.6` export dump (one symbol
//! per line).

use std::collections::{HashMap, HashSet};
use std::io::{self, BufRead};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Functions whose call ends the process. The node reached after one of
/// these is an accepting state.
pub const EXIT_CALLS: [&str; 4] = ["exit", "_exit", "quick_exit", "abort"];

/// Whether a call to `name` terminates the process.
pub fn is_exit_call(name: &str) -> bool {
    EXIT_CALLS.contains(&name)
}

/// Built-in libc export names, sorted. Probe numbers in the built-in
/// [`SyscallTable`] are indices into this list.
static BUILTIN_LIBC_NAMES: &[&str] = &[
    "_exit",
    "abort",
    "accept",
    "access",
    "atexit",
    "atoi",
    "bind",
    "calloc",
    "chdir",
    "chmod",
    "close",
    "closedir",
    "connect",
    "dup",
    "dup2",
    "execve",
    "exit",
    "fclose",
    "fcntl",
    "fflush",
    "fgets",
    "fopen",
    "fork",
    "fprintf",
    "fputs",
    "fread",
    "free",
    "fscanf",
    "fseek",
    "fstat",
    "ftell",
    "fwrite",
    "getcwd",
    "getenv",
    "getline",
    "getpid",
    "getppid",
    "gettimeofday",
    "isatty",
    "kill",
    "listen",
    "lseek",
    "lstat",
    "malloc",
    "memchr",
    "memcmp",
    "memcpy",
    "memmove",
    "memset",
    "mkdir",
    "mmap",
    "mprotect",
    "munmap",
    "nanosleep",
    "open",
    "opendir",
    "perror",
    "pipe",
    "poll",
    "printf",
    "pthread_create",
    "pthread_join",
    "putchar",
    "puts",
    "qsort",
    "quick_exit",
    "raise",
    "read",
    "readdir",
    "readlink",
    "realloc",
    "recv",
    "recvfrom",
    "rename",
    "rewind",
    "rmdir",
    "scanf",
    "select",
    "send",
    "sendto",
    "setenv",
    "sigaction",
    "signal",
    "sleep",
    "snprintf",
    "socket",
    "sprintf",
    "sscanf",
    "stat",
    "strcat",
    "strchr",
    "strcmp",
    "strcpy",
    "strdup",
    "strlen",
    "strncmp",
    "strncpy",
    "strrchr",
    "strstr",
    "strtol",
    "system",
    "time",
    "unlink",
    "usleep",
    "vfprintf",
    "vprintf",
    "wait",
    "waitpid",
    "write",
];

static BUILTIN_LIBC: Lazy<LibcCalls> =
    Lazy::new(|| LibcCalls::from_names(BUILTIN_LIBC_NAMES.iter().copied()));

static BUILTIN_SYSCALLS: Lazy<SyscallTable> =
    Lazy::new(|| SyscallTable::from_names(BUILTIN_LIBC_NAMES.iter().copied()));

/// The set of known libc function names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibcCalls {
    names: HashSet<String>,
}

impl LibcCalls {
    /// Build from an explicit name list.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a newline-separated export dump, one symbol per line. Blank
    /// lines are skipped.
    pub fn from_reader<R: BufRead>(reader: R) -> io::Result<Self> {
        let mut names = HashSet::new();
        for line in reader.lines() {
            let line = line?;
            let name = line.trim();
            if !name.is_empty() {
                names.insert(name.to_owned());
            }
        }
        Ok(Self { names })
    }

    /// The built-in table.
    pub fn builtin() -> &'static Self {
        &BUILTIN_LIBC
    }

    pub fn is_libc(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for LibcCalls {
    fn default() -> Self {
        Self::builtin().clone()
    }
}

/// Maps libc function names to probe numbers.
///
/// Numbers are synthetic: the index of the name in the sorted,
/// deduplicated list the table was built from, matching the scheme of the
/// generated probe header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyscallTable {
    numbers: HashMap<String, u64>,
}

impl SyscallTable {
    /// Number names by sorted position.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut sorted: Vec<String> = names.into_iter().map(Into::into).collect();
        sorted.sort();
        sorted.dedup();
        Self {
            numbers: sorted
                .into_iter()
                .enumerate()
                .map(|(nr, name)| (name, nr as u64))
                .collect(),
        }
    }

    /// The built-in table, numbered over the built-in libc names.
    pub fn builtin() -> &'static Self {
        &BUILTIN_SYSCALLS
    }

    /// The probe number for `name`, if the table maps it.
    pub fn lookup(&self, name: &str) -> Option<u64> {
        self.numbers.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }
}

impl Default for SyscallTable {
    fn default() -> Self {
        Self::builtin().clone()
    }
}
