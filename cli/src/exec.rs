//! Command-line execution.
//!
//! Resolves argv against a [`Command`] tree: leading bare tokens descend
//! into subcommands, flag tokens bind to the target command or to an
//! ancestor's persistent flags, and remaining bare tokens are applied as
//! positional arguments before the target's run function fires.

use std::collections::HashSet;

use tracing::debug;

use crate::command::{BoundInput, Command};
use crate::error::CliError;
use crate::help;
use crate::token::FlagToken;

/// What an [`execute`] call did.
#[derive(Debug)]
pub enum Outcome {
    /// The target command's run function completed.
    Ran,
    /// Help was requested (or the target was not runnable); the rendered
    /// help text is returned for the caller to print.
    Help(String),
}

enum Owner {
    Target,
    Ancestor(usize),
}

/// Executes `argv` against the command tree rooted at `root`.
///
/// `argv` excludes the program name. `--help` and `-h` are reserved and
/// short-circuit to [`Outcome::Help`]; `--` ends flag parsing.
///
/// # Errors
///
/// [`CliError::UnknownCommand`] and [`CliError::UnknownFlag`] for tokens
/// that resolve to nothing, [`CliError::MissingValue`] and
/// [`CliError::MissingRequiredFlag`] for incomplete flag usage, and
/// [`CliError::Bind`] / [`CliError::Run`] for failures from the bound
/// input itself.
pub fn execute(root: &mut Command, argv: &[String]) -> Result<Outcome, CliError> {
    // Subcommand descent over the leading bare tokens.
    let mut path: Vec<usize> = Vec::new();
    let mut consumed = 0;
    {
        let mut cur: &Command = root;
        for tok in argv {
            if matches!(FlagToken::parse(tok), FlagToken::Bare(_)) {
                if let Some(idx) = cur.find_mut_index(tok) {
                    path.push(idx);
                    cur = &cur.children()[idx];
                    consumed += 1;
                    continue;
                }
            }
            break;
        }
    }
    let rest = &argv[consumed..];

    let target = follow(root, &path);
    let cmd_name = target.name().to_string();
    debug!(command = %cmd_name, tokens = rest.len(), "Resolved command");

    if rest
        .iter()
        .take_while(|t| t.as_str() != "--")
        .any(|t| t == "--help" || t == "-h")
    {
        return Ok(Outcome::Help(help::render(root, &path)));
    }

    if !target.is_runnable() {
        if let Some(first) = rest.first() {
            if matches!(FlagToken::parse(first), FlagToken::Bare(_)) {
                return Err(CliError::UnknownCommand {
                    name: first.clone(),
                    parent: cmd_name,
                });
            }
        }
        return Ok(Outcome::Help(help::render(root, &path)));
    }

    // Re-walk mutably, keeping each ancestor's bound state reachable for
    // persistent flags.
    let mut ancestors: Vec<Option<&mut Box<dyn BoundInput>>> = Vec::new();
    let mut cur: &mut Command = root;
    for &idx in &path {
        let Command { children, state, .. } = cur;
        ancestors.push(state.as_mut());
        cur = &mut children[idx];
    }
    let mut state = cur.state.as_mut();

    let mut set_names: HashSet<String> = HashSet::new();
    let mut positionals: Vec<String> = Vec::new();
    let mut terminated = false;
    let mut it = rest.iter();
    while let Some(tok) = it.next() {
        if terminated {
            positionals.push(tok.clone());
            continue;
        }
        match FlagToken::parse(tok) {
            FlagToken::Terminator => terminated = true,
            FlagToken::Bare(t) => positionals.push(t.to_string()),
            FlagToken::Long { name, value } => apply_flag(
                name, false, value, &mut it, &cmd_name, &mut state, &mut ancestors,
                &mut set_names,
            )?,
            FlagToken::Short { name, value } => apply_flag(
                name, true, value, &mut it, &cmd_name, &mut state, &mut ancestors,
                &mut set_names,
            )?,
        }
    }

    let Some(state) = state.as_mut() else {
        return Err(CliError::NotRunnable { command: cmd_name });
    };

    for flag in state.registry().flags() {
        if flag.required && !set_names.contains(&flag.name) {
            return Err(CliError::MissingRequiredFlag {
                name: flag.name.clone(),
            });
        }
    }

    state.apply_args(&positionals)?;
    debug!(command = %cmd_name, args = positionals.len(), "Running command");
    state.run().map_err(CliError::Run)?;
    Ok(Outcome::Ran)
}

fn follow<'a>(root: &'a Command, path: &[usize]) -> &'a Command {
    let mut cur = root;
    for &idx in path {
        cur = &cur.children()[idx];
    }
    cur
}

#[allow(clippy::too_many_arguments)]
fn apply_flag(
    name: &str,
    short: bool,
    inline: Option<&str>,
    it: &mut std::slice::Iter<'_, String>,
    cmd_name: &str,
    state: &mut Option<&mut Box<dyn BoundInput>>,
    ancestors: &mut [Option<&mut Box<dyn BoundInput>>],
    set_names: &mut HashSet<String>,
) -> Result<(), CliError> {
    let lookup = |reg: &flagbind_core::Registry| {
        let found = if short {
            reg.flag_by_shorthand(name)
        } else {
            reg.flag(name)
        };
        found.map(|f| (f.name.clone(), f.value_type == "bool", f.persistent))
    };

    let mut owner = Owner::Target;
    let mut found = match &state {
        Some(s) => lookup(s.registry()),
        None => None,
    };
    if found.is_none() {
        // nearest enclosing command wins
        for (j, ancestor) in ancestors.iter().enumerate().rev() {
            if let Some(s) = ancestor {
                if let Some(f) = lookup(s.registry()) {
                    if f.2 {
                        owner = Owner::Ancestor(j);
                        found = Some(f);
                        break;
                    }
                }
            }
        }
    }
    let Some((canonical, is_bool, _)) = found else {
        return Err(CliError::UnknownFlag {
            name: name.to_string(),
            command: cmd_name.to_string(),
        });
    };

    let value = match inline {
        Some(v) => v.to_string(),
        None if is_bool => "true".to_string(),
        None => match it.next() {
            Some(v) => v.clone(),
            None => {
                return Err(CliError::MissingValue { name: canonical });
            }
        },
    };

    debug!(flag = %canonical, value = %value, "Setting flag");
    match owner {
        Owner::Target => match state.as_mut() {
            Some(s) => s.set_flag(&canonical, &value)?,
            None => {
                return Err(CliError::UnknownFlag {
                    name: name.to_string(),
                    command: cmd_name.to_string(),
                });
            }
        },
        Owner::Ancestor(j) => match ancestors[j].as_mut() {
            Some(s) => s.set_flag(&canonical, &value)?,
            None => {
                return Err(CliError::UnknownFlag {
                    name: name.to_string(),
                    command: cmd_name.to_string(),
                });
            }
        },
    }
    if matches!(owner, Owner::Target) {
        set_names.insert(canonical);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flagbind_core::{Bindable, BindError, FieldCollector};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct GetOpts {
        id: String,
        raw: bool,
    }

    impl Bindable for GetOpts {
        fn collect<'a>(&'a mut self, fields: &mut FieldCollector<'a>) -> Result<(), BindError> {
            fields.bind("id", &mut self.id, "arg,id,object id,0")?;
            fields.bind("raw", &mut self.raw, "flag,raw,print raw bytes,r")
        }
    }

    fn tree(seen: Arc<Mutex<Vec<String>>>) -> Command {
        Command::new("app").child(
            Command::new("get")
                .bind(GetOpts::default(), move |opts| {
                    seen.lock()
                        .unwrap()
                        .push(format!("{}:{}", opts.id, opts.raw));
                    Ok(())
                })
                .unwrap(),
        )
    }

    #[test]
    fn test_execute_descends_and_runs() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut root = tree(seen.clone());
        let argv: Vec<String> = ["get", "--raw", "obj-1"].iter().map(|s| s.to_string()).collect();
        let outcome = execute(&mut root, &argv).unwrap();
        assert!(matches!(outcome, Outcome::Ran));
        assert_eq!(seen.lock().unwrap().as_slice(), ["obj-1:true"]);
    }

    #[test]
    fn test_shorthand_and_inline_values() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut root = tree(seen.clone());
        let argv: Vec<String> = ["get", "-r=false", "obj-2"].iter().map(|s| s.to_string()).collect();
        execute(&mut root, &argv).unwrap();
        assert_eq!(seen.lock().unwrap().as_slice(), ["obj-2:false"]);
    }

    #[test]
    fn test_terminator_makes_tokens_positional() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut root = tree(seen.clone());
        let argv: Vec<String> = ["get", "--", "--raw"].iter().map(|s| s.to_string()).collect();
        execute(&mut root, &argv).unwrap();
        // "--raw" lands in the positional slot untouched by flag parsing
        assert_eq!(seen.lock().unwrap().as_slice(), ["--raw:false"]);
    }

    #[test]
    fn test_unknown_command_and_flag() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut root = tree(seen);
        let argv: Vec<String> = vec!["frobnicate".to_string()];
        let err = execute(&mut root, &argv).unwrap_err();
        assert!(matches!(err, CliError::UnknownCommand { .. }));

        let argv: Vec<String> = ["get", "--nope"].iter().map(|s| s.to_string()).collect();
        let err = execute(&mut root, &argv).unwrap_err();
        assert!(matches!(err, CliError::UnknownFlag { .. }));
    }

    #[test]
    fn test_help_is_reserved() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut root = tree(seen.clone());
        let argv: Vec<String> = ["get", "--help"].iter().map(|s| s.to_string()).collect();
        let outcome = execute(&mut root, &argv).unwrap();
        match outcome {
            Outcome::Help(text) => assert!(text.contains("--raw")),
            Outcome::Ran => unreachable!(),
        }
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_bare_root_prints_help() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut root = tree(seen);
        let outcome = execute(&mut root, &[]).unwrap();
        match outcome {
            Outcome::Help(text) => assert!(text.contains("get")),
            Outcome::Ran => unreachable!(),
        }
    }
}
