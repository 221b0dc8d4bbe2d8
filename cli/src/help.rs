//! Help rendering.
//!
//! Produces the plain-text help for a command: usage line, subcommand
//! listing, positional-argument usages, and the command's own and
//! inherited flags, each block aligned on the widest entry.

use flagbind_core::{BoundFlag, Registry};

use crate::command::Command;

/// Renders the help text for the command at `path` under `root`.
pub fn render(root: &Command, path: &[usize]) -> String {
    let mut ancestors: Vec<&Command> = Vec::new();
    let mut cur = root;
    for &idx in path {
        ancestors.push(cur);
        cur = &cur.children()[idx];
    }

    let mut out = String::new();
    let about = if cur.long_help().is_empty() {
        cur.short_help()
    } else {
        cur.long_help()
    };
    if !about.is_empty() {
        out.push_str(about);
        out.push_str("\n\n");
    }

    out.push_str("Usage:\n  ");
    for a in &ancestors {
        out.push_str(a.name());
        out.push(' ');
    }
    out.push_str(cur.usage_line());
    if cur.registry().map(|r| r.flags().count() > 0).unwrap_or(false) {
        out.push_str(" [flags]");
    }
    out.push('\n');

    let visible: Vec<&Command> = cur.children().iter().filter(|c| !c.is_hidden()).collect();
    if !visible.is_empty() {
        out.push_str("\nAvailable Commands:\n");
        let width = visible.iter().map(|c| c.name().len()).max().unwrap_or(0);
        for c in visible {
            out.push_str(&format!("  {:width$}  {}\n", c.name(), c.short_help()));
        }
    }

    if !cur.example_text().is_empty() {
        out.push_str("\nExamples:\n");
        for line in cur.example_text().lines() {
            out.push_str("  ");
            out.push_str(line);
            out.push('\n');
        }
    }

    if let Some(registry) = cur.registry() {
        render_args(&mut out, registry);
        render_flags(&mut out, "Flags", registry.flags().filter(|f| !f.hidden));
    }
    let inherited: Vec<&BoundFlag> = ancestors
        .iter()
        .rev()
        .filter_map(|a| a.registry())
        .flat_map(Registry::flags)
        .filter(|f| f.persistent && !f.hidden)
        .collect();
    render_flags(&mut out, "Global Flags", inherited.into_iter());

    out
}

fn render_args(out: &mut String, registry: &Registry) {
    let args = registry.args();
    if args.is_empty() {
        return;
    }
    out.push_str("\nArguments:\n");
    let width = args.iter().map(|a| a.name.len()).max().unwrap_or(0);
    for a in args {
        out.push_str(&format!("  {:width$}  {}\n", a.name, a.usage));
    }
}

fn render_flags<'a>(out: &mut String, title: &str, flags: impl Iterator<Item = &'a BoundFlag>) {
    let lines: Vec<(String, &str)> = flags.map(|f| (flag_stanza(f), f.usage.as_str())).collect();
    if lines.is_empty() {
        return;
    }
    out.push_str(&format!("\n{title}:\n"));
    let width = lines.iter().map(|(s, _)| s.len()).max().unwrap_or(0);
    for (stanza, usage) in lines {
        out.push_str(&format!("  {stanza:width$}  {usage}\n"));
    }
}

fn flag_stanza(f: &BoundFlag) -> String {
    let mut s = if f.shorthand.is_empty() {
        format!("    --{}", f.name)
    } else {
        format!("-{}, --{}", f.shorthand, f.name)
    };
    if f.value_type != "bool" {
        s.push(' ');
        s.push_str(&f.value_type);
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use flagbind_core::{Bindable, BindError, FieldCollector};

    #[derive(Default)]
    struct Opts {
        id: String,
        raw: bool,
        secret: String,
    }

    impl Bindable for Opts {
        fn collect<'a>(&'a mut self, fields: &mut FieldCollector<'a>) -> Result<(), BindError> {
            fields.bind("id", &mut self.id, "arg,id,object id,0")?;
            fields.bind("raw", &mut self.raw, "flag,raw,print raw bytes,r")?;
            fields.bind("secret", &mut self.secret, "flag,secret,internal,,,,true")
        }
    }

    #[derive(Default)]
    struct RootOpts {
        verbose: bool,
    }

    impl Bindable for RootOpts {
        fn collect<'a>(&'a mut self, fields: &mut FieldCollector<'a>) -> Result<(), BindError> {
            fields.bind("verbose", &mut self.verbose, "flag,verbose,log more,v,true")
        }
    }

    fn tree() -> Command {
        Command::new("app")
            .bind(RootOpts::default(), |_| Ok(()))
            .unwrap()
            .child(
                Command::new("get")
                    .use_line("get <id>")
                    .short("Fetch an object")
                    .bind(Opts::default(), |_| Ok(()))
                    .unwrap(),
            )
    }

    #[test]
    fn test_render_child_help() {
        let root = tree();
        let text = render(&root, &[0]);
        assert!(text.contains("Fetch an object"));
        assert!(text.contains("Usage:\n  app get <id> [flags]"));
        assert!(text.contains("-r, --raw"));
        assert!(text.contains("object id"));
        // hidden flags stay out, inherited persistent flags show up
        assert!(!text.contains("--secret"));
        assert!(text.contains("Global Flags"));
        assert!(text.contains("--verbose"));
    }

    #[test]
    fn test_render_root_lists_children() {
        let root = tree();
        let text = render(&root, &[]);
        assert!(text.contains("Available Commands:"));
        assert!(text.contains("get"));
        assert!(!text.contains("Global Flags"));
    }
}
