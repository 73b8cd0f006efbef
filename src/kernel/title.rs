// CLASSIFICATION: COMMUNITY
// Filename: title.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! Title launch metadata as returned by the MCP prepare-title request.

use serde::{Deserialize, Serialize};

pub type TitleId = u64;

/// Title id the kernel asks MCP to prepare at boot.
pub const DEFAULT_TITLE_ID: TitleId = 0xFFFF_FFFF_FFFF_FFFE;

/// Size of the argument string field, terminator included.
pub const ARGSTR_CAPACITY: usize = 4096;

/// Launch metadata for a title.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TitleInfo {
    pub version: u32,
    pub title_id: TitleId,
    pub cmd_flags: u32,
    /// Executable path followed by its launch arguments.
    pub argstr: String,
    pub max_size: u32,
    pub avail_size: u32,
    pub codegen_size: u32,
    pub codegen_core: u32,
    pub max_codesize: u32,
    pub default_stack0_size: u32,
    pub default_stack1_size: u32,
    pub default_stack2_size: u32,
    pub exception_stack0_size: u32,
    pub exception_stack1_size: u32,
    pub exception_stack2_size: u32,
}

impl TitleInfo {
    /// Metadata used when MCP cannot prepare a title, launching `executable`
    /// directly. These values must not change.
    pub fn fallback(executable: &str) -> Self {
        let mut info = TitleInfo {
            version: 1,
            cmd_flags: 0,
            avail_size: 0,
            codegen_size: 0,
            codegen_core: 1,
            max_size: 0x4000_0000,
            max_codesize: 0x0E00_0000,
            default_stack0_size: 0,
            default_stack1_size: 0,
            default_stack2_size: 0,
            exception_stack0_size: 0x1000,
            exception_stack1_size: 0x1000,
            exception_stack2_size: 0x1000,
            ..TitleInfo::default()
        };
        info.set_argstr(executable);
        info
    }

    /// Store `argstr` the way the fixed-size guest field holds it: cut at the
    /// first NUL and truncated to fit with its terminator.
    pub fn set_argstr(&mut self, argstr: &str) {
        let argstr = argstr.split('\0').next().unwrap_or_default();
        let mut end = argstr.len().min(ARGSTR_CAPACITY - 1);
        while !argstr.is_char_boundary(end) {
            end -= 1;
        }
        self.argstr = argstr[..end].to_string();
    }

    pub fn executable(&self) -> &str {
        executable_from_argstr(&self.argstr)
    }
}

/// Leading token of an argument string, up to the first space.
pub fn executable_from_argstr(argstr: &str) -> &str {
    argstr.split_once(' ').map_or(argstr, |(executable, _)| executable)
}
