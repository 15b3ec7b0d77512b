//! Prompt construction from the user's question and local context

use std::path::{Path, PathBuf};

use log::debug;

/// Tools reported to the model when found on `PATH`
pub const KNOWN_TOOLS: &[&str] = &[
  "git", "npm", "node", "python", "docker", "pip"
, "go", "rustc", "cargo", "java", "mvn", "gradle"
];

/// Directory entries listed before truncating
pub const MAX_LISTED_FILES: usize = 20;

/// Facts about the user's environment included in the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemContext
{   pub os: String
  , pub shell: String
  , pub cwd: String
  , pub user: String
  , pub git_repo: bool
  , pub files: String
  , pub tools: String
}

impl SystemContext
{   /// Gather context for the current process.
    pub fn gather() -> Self
    {   let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let files = match list_files(&cwd)
        {   Ok(names) => describe_files(names)
          , Err(e) => {
              debug!("Could not list {}: {}", cwd.display(), e);
              "Error listing files".to_string()
            }
        };
        let context = SystemContext
        {   os: os_description()
          , shell: current_shell()
          , git_repo: cwd.join(".git").exists()
          , cwd: cwd.display().to_string()
          , user: current_user()
          , files
          , tools: installed_tools(std::env::var_os("PATH")).join(", ")
        };
        debug!("Gathered context: {:?}", context);
        context
    }
}

fn list_files(dir: &Path) -> std::io::Result<Vec<String>>
{   let mut names = std::fs::read_dir(dir)?
      .filter_map(|entry| entry.ok())
      .map(|entry| entry.file_name().to_string_lossy().into_owned())
      .collect::<Vec<_>>();
    names.sort();
    Ok(names)
}

/// First [`MAX_LISTED_FILES`] names, comma separated, with `...` when
/// there were more.
pub fn describe_files(names: Vec<String>) -> String
{   let truncated = names.len() > MAX_LISTED_FILES;
    let mut listed = names
      .into_iter()
      .take(MAX_LISTED_FILES)
      .collect::<Vec<_>>()
      .join(", ");
    if truncated
    {   listed.push_str("...");
    }
    listed
}

/// Entries of [`KNOWN_TOOLS`] present in the directories of `path_var`.
pub fn installed_tools(path_var: Option<std::ffi::OsString>) -> Vec<&'static str>
{   let dirs: Vec<PathBuf> = match path_var
    {   Some(raw) => std::env::split_paths(&raw).collect()
      , None => return vec![]
    };
    KNOWN_TOOLS
      .iter()
      .copied()
      .filter(|tool| dirs.iter().any(|dir| is_executable_in(dir, tool)))
      .collect()
}

fn is_executable_in(dir: &Path, tool: &str) -> bool
{   if dir.join(tool).is_file()
    {   return true;
    }
    cfg!(windows) && dir.join(format!("{}.exe", tool)).is_file()
}

fn os_description() -> String
{   let release = std::fs::read_to_string("/proc/sys/kernel/osrelease")
      .map(|r| r.trim().to_string())
      .unwrap_or_default();
    if release.is_empty()
    {   std::env::consts::OS.to_string()
    } else
    {   format!("{} {}", std::env::consts::OS, release)
    }
}

fn current_user() -> String
{   std::env::var("USER")
      .or_else(|_| std::env::var("USERNAME"))
      .unwrap_or_else(|_| "unknown".to_string())
}

/// Name of the parent process, falling back to `$SHELL`.
fn current_shell() -> String
{   #[cfg(unix)]
    {   let ppid = std::os::unix::process::parent_id();
        if let Ok(name) = std::fs::read_to_string(format!("/proc/{}/comm", ppid))
        {   let name = name.trim();
            if !name.is_empty()
            {   return name.to_string();
            }
        }
    }
    std::env::var("SHELL")
      .ok()
      .and_then(|shell| {
        Path::new(&shell)
          .file_name()
          .map(|name| name.to_string_lossy().into_owned())
      })
      .unwrap_or_else(|| "Unknown".to_string())
}

/// Render the full prompt sent to the model.
pub fn build_prompt(context: &SystemContext, question: &str) -> String
{   let git_repo = if context.git_repo { "Yes" } else { "No" };
    format!(
"SYSTEM:
You are an expert, concise shell assistant. Your goal is to provide accurate, executable shell commands.

CONTEXT:
-   **OS:** {os}
-   **Shell:** {shell}
-   **CWD:** {cwd}
-   **User:** {user}
-   **Git Repo:** {git_repo}
-   **Files (top 20):** {files}
-   **Available Tools:** {tools}

RULES:
1.  **Primary Goal:** Generate *only* the exact, executable shell command(s) for the `{shell}` environment.
2.  **Context is Key:** Use the CONTEXT (CWD, Files, OS) to write specific, correct commands.
3.  **No Banter:** Do NOT include greetings, sign-offs, or conversational filler (e.g., \"Here is the command:\").
4.  **Safety:** If a command is complex or destructive (e.g., `rm -rf`, `find -delete`), add a single-line comment (`# ...`) *after* the command explaining what it does.
5.  **Questions:** If the user asks a question (e.g., \"what is `ls`?\"), provide a concise, one-line answer. Do not output a command.
6.  **Ambiguity:** If the request is unclear, ask a single, direct clarifying question. Start the line with `#`.

REQUEST:
{question}

RESPONSE:
"
    , os = context.os
    , shell = context.shell
    , cwd = context.cwd
    , user = context.user
    , git_repo = git_repo
    , files = context.files
    , tools = context.tools
    , question = question
    )
}
