use std::path::Path;

use crate::DataError;

/// What to do when an output file already exists.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverwritePolicy {
    /// Ask on the terminal.
    #[default]
    Ask,
    Overwrite,
    Raise,
}
impl std::str::FromStr for OverwritePolicy {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ask" => Ok(Self::Ask),
            "overwrite" => Ok(Self::Overwrite),
            "raise" => Ok(Self::Raise),
            other => Err(DataError::InvalidArgument(format!(
                "unknown overwrite policy '{other}', expected 'ask', 'overwrite' or 'raise'"
            ))),
        }
    }
}
impl std::fmt::Display for OverwritePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            OverwritePolicy::Ask => "ask",
            OverwritePolicy::Overwrite => "overwrite",
            OverwritePolicy::Raise => "raise",
        })
    }
}

pub fn handle_overwrite(paths: &[&Path], policy: OverwritePolicy) -> Result<(), DataError> {
    handle_overwrite_with(paths, policy, prompt_terminal)
}

/// Checks `paths` against `policy`. `prompt` is only consulted for
/// [`OverwritePolicy::Ask`] and only if at least one path exists.
pub fn handle_overwrite_with<F>(
    paths: &[&Path],
    policy: OverwritePolicy,
    mut prompt: F,
) -> Result<(), DataError>
where
    F: FnMut(&[&Path]) -> bool,
{
    let existing = paths
        .iter()
        .copied()
        .filter(|p| p.exists())
        .collect::<Vec<_>>();
    let Some(first) = existing.first() else {
        return Ok(());
    };
    match policy {
        OverwritePolicy::Overwrite => {
            for path in &existing {
                tracing::debug!("Overwriting '{}'.", path.display());
            }
            Ok(())
        }
        OverwritePolicy::Raise => Err(DataError::FileExists(first.to_path_buf())),
        OverwritePolicy::Ask => {
            if prompt(&existing) {
                Ok(())
            } else {
                Err(DataError::OverwriteDeclined(first.to_path_buf()))
            }
        }
    }
}

fn prompt_terminal(existing: &[&Path]) -> bool {
    use std::io::Write;
    let stdin = std::io::stdin();
    loop {
        eprintln!("The following files already exist:");
        for path in existing {
            eprintln!("    {}", path.display());
        }
        eprint!("Overwrite? [y/n] ");
        let _ = std::io::stderr().flush();
        let mut answer = String::new();
        match stdin.read_line(&mut answer) {
            Ok(0) | Err(_) => return false,
            Ok(_) => {}
        }
        match answer.trim().to_lowercase().as_str() {
            "y" | "yes" => return true,
            "n" | "no" => return false,
            _ => continue,
        }
    }
}

#[test]
fn policy_parses() {
    assert_eq!("ask".parse::<OverwritePolicy>().unwrap(), OverwritePolicy::Ask);
    assert_eq!(
        "overwrite".parse::<OverwritePolicy>().unwrap(),
        OverwritePolicy::Overwrite
    );
    assert_eq!("raise".parse::<OverwritePolicy>().unwrap(), OverwritePolicy::Raise);
    assert!("maybe".parse::<OverwritePolicy>().is_err());
}
#[test]
fn missing_files_never_prompt() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nothing.csv");
    handle_overwrite_with(&[&path], OverwritePolicy::Ask, |_| {
        panic!("no prompt expected")
    })
    .unwrap();
}
#[test]
fn existing_files_follow_policy() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.csv");
    std::fs::write(&path, "index\n").unwrap();
    let paths = [path.as_path()];

    handle_overwrite_with(&paths, OverwritePolicy::Overwrite, |_| false).unwrap();
    assert!(matches!(
        handle_overwrite_with(&paths, OverwritePolicy::Raise, |_| true),
        Err(DataError::FileExists(_))
    ));
    handle_overwrite_with(&paths, OverwritePolicy::Ask, |existing| {
        existing.len() == 1
    })
    .unwrap();
    assert!(matches!(
        handle_overwrite_with(&paths, OverwritePolicy::Ask, |_| false),
        Err(DataError::OverwriteDeclined(_))
    ));
}
