//! Power actions and the Windows command tables they map to
//!
//! Two command sets exist for shutdown/reboot/hibernate because older
//! Windows builds reject the `-sg`/`-g` restart-apps switches. The set is
//! chosen once per deployment through [`crate::config::ControlConfig`].

use crate::constants::HELPER_SCRIPT_NAME;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Power intents a caller can request for a host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerAction {
    Wake,
    Sleep,
    Hibernate,
    Shutdown,
    Reboot,
    Lock,
}

/// How the dispatcher must approach the host before running an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// Host is assumed unreachable; no connect or probe
    Offline,
    /// Connect and probe first, run the action only if the host answers
    Online,
}

impl PowerAction {
    pub const ALL: [PowerAction; 6] = [
        PowerAction::Wake,
        PowerAction::Sleep,
        PowerAction::Hibernate,
        PowerAction::Shutdown,
        PowerAction::Reboot,
        PowerAction::Lock,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PowerAction::Wake => "wake",
            PowerAction::Sleep => "sleep",
            PowerAction::Hibernate => "hibernate",
            PowerAction::Shutdown => "shutdown",
            PowerAction::Reboot => "reboot",
            PowerAction::Lock => "lock",
        }
    }

    /// Wake targets a machine that is off, everything else needs the shell
    pub fn mode(&self) -> DispatchMode {
        match self {
            PowerAction::Wake => DispatchMode::Offline,
            _ => DispatchMode::Online,
        }
    }
}

impl fmt::Display for PowerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PowerAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        PowerAction::ALL
            .into_iter()
            .find(|action| action.as_str() == lower)
            .ok_or_else(|| format!("Unknown power action '{}'", s.trim()))
    }
}

/// Script staged on the remote host before it can be executed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelperScript {
    pub file_name: &'static str,
    pub contents: &'static str,
}

/// Suspends to RAM through `powrprof.dll!SetSuspendState`.
///
/// `rundll32 powrprof.dll,SetSuspendState` misparses its arguments and
/// hibernates instead when hibernation is enabled, so the call goes through
/// P/Invoke with explicit booleans: no hibernate, force critical, disable
/// wake events.
pub const SUSPEND_SCRIPT: HelperScript = HelperScript {
    file_name: HELPER_SCRIPT_NAME,
    contents: r#"$ErrorActionPreference = 'Stop'
$signature = @'
[DllImport("powrprof.dll", SetLastError = true)]
public static extern bool SetSuspendState(bool hibernate, bool forceCritical, bool disableWakeEvent);
'@
$power = Add-Type -MemberDefinition $signature -Name PowrProf -Namespace WinTurn -PassThru
if (-not $power::SetSuspendState($false, $true, $true)) {
    throw "SetSuspendState failed with error $([Runtime.InteropServices.Marshal]::GetLastWin32Error())"
}
"#,
};

/// What the Host Session has to do to carry out an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionPlan {
    /// Send a magic packet; never touches the SSH channel
    WakeOnLan,
    /// Run one fixed command on the remote shell
    Exec(&'static str),
    /// Make sure the script exists remotely, then run it
    StagedScript(&'static HelperScript),
}

/// Command table variant for shutdown, reboot and hibernate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandSet {
    /// Windows 8 and later: restart-apps switches and a planned shutdown reason
    #[default]
    Modern,
    /// Builds that only understand the classic `/s /r /h` switches
    Classic,
}

const LOCK_COMMAND: &str = "rundll32.exe user32.dll,LockWorkStation";

impl CommandSet {
    pub fn plan(&self, action: PowerAction) -> ActionPlan {
        match (self, action) {
            (_, PowerAction::Wake) => ActionPlan::WakeOnLan,
            (_, PowerAction::Sleep) => ActionPlan::StagedScript(&SUSPEND_SCRIPT),
            (_, PowerAction::Lock) => ActionPlan::Exec(LOCK_COMMAND),
            (CommandSet::Modern, PowerAction::Shutdown) => {
                ActionPlan::Exec("Shutdown.exe -sg -f -d p:2:4")
            }
            (CommandSet::Modern, PowerAction::Reboot) => ActionPlan::Exec("Shutdown.exe -r -g -f"),
            (CommandSet::Modern, PowerAction::Hibernate) => ActionPlan::Exec("Shutdown.exe -h -f"),
            (CommandSet::Classic, PowerAction::Shutdown) => {
                ActionPlan::Exec("shutdown.exe /s /f /t 0")
            }
            (CommandSet::Classic, PowerAction::Reboot) => ActionPlan::Exec("shutdown.exe /r /f /t 0"),
            (CommandSet::Classic, PowerAction::Hibernate) => ActionPlan::Exec("shutdown.exe /h /f"),
        }
    }
}

impl FromStr for CommandSet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "modern" => Ok(CommandSet::Modern),
            "classic" => Ok(CommandSet::Classic),
            other => Err(format!(
                "Unknown command set '{}' (expected 'modern' or 'classic')",
                other
            )),
        }
    }
}

/// Remote path of a staged script, in SFTP syntax.
///
/// An empty directory resolves to the SSH user's home, which is where both
/// SFTP relative paths and the remote shell's working directory point.
pub fn helper_remote_path(script: &HelperScript, remote_dir: &str) -> String {
    let dir = remote_dir.trim().trim_end_matches(['/', '\\']);
    if dir.is_empty() {
        script.file_name.to_string()
    } else {
        format!("{}/{}", dir, script.file_name)
    }
}

/// Command that runs a staged PowerShell script at `remote_path`.
///
/// Windows OpenSSH exposes drive paths to SFTP as `/C:/...`; the shell wants
/// `C:/...`.
pub fn helper_exec_command(remote_path: &str) -> String {
    let bytes = remote_path.as_bytes();
    let shell_path = if bytes.len() > 2 && bytes[0] == b'/' && bytes[2] == b':' {
        &remote_path[1..]
    } else {
        remote_path
    };
    format!(
        "powershell.exe -NoProfile -NonInteractive -ExecutionPolicy Bypass -File \"{}\"",
        shell_path
    )
}
