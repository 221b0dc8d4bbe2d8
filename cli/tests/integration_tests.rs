//! End-to-end tests driving a small command tree through `execute`.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use flagbind_cli::{CliError, Command, Outcome, execute};
use flagbind_core::{Bindable, BindError, FieldCollector};

fn argv(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|t| t.to_string()).collect()
}

#[derive(Default, Clone)]
struct GlobalOpts {
    verbose: bool,
    config: String,
}

impl Bindable for GlobalOpts {
    fn collect<'a>(&'a mut self, fields: &mut FieldCollector<'a>) -> Result<(), BindError> {
        fields.bind("verbose", &mut self.verbose, "flag,verbose,log more,v,true")?;
        fields.bind("config", &mut self.config, "flag,config,config file path,c,true")
    }
}

#[derive(Default, Clone)]
struct PutOpts {
    id: String,
    files: Vec<String>,
    timeout: Duration,
    replicas: Option<i64>,
}

impl Bindable for PutOpts {
    fn collect<'a>(&'a mut self, fields: &mut FieldCollector<'a>) -> Result<(), BindError> {
        fields.bind("id", &mut self.id, "flag,id,target id,i,,true")?;
        fields.bind("timeout", &mut self.timeout, "flag,timeout,upload timeout")?;
        fields.bind("replicas", &mut self.replicas, "flag,replicas,copy count")?;
        fields.bind("files", &mut self.files, "arg,files,files to upload,0")
    }
}

type Captured<T> = Arc<Mutex<Vec<T>>>;

fn tree(globals: Captured<GlobalOpts>, puts: Captured<PutOpts>) -> Command {
    let globals_for_run = globals.clone();
    Command::new("store")
        .short("Content store client")
        .bind(GlobalOpts::default(), move |g| {
            globals_for_run.lock().unwrap().push(g.clone());
            Ok(())
        })
        .unwrap()
        .child(
            Command::new("put")
                .use_line("put <files...>")
                .short("Upload files")
                .bind(PutOpts::default(), move |p| {
                    if p.id.is_empty() {
                        return Err("empty id".into());
                    }
                    puts.lock().unwrap().push(p.clone());
                    Ok(())
                })
                .unwrap(),
        )
        .child(Command::new("admin").child(Command::new("gc")))
}

fn captured<T>() -> Captured<T> {
    Arc::new(Mutex::new(Vec::new()))
}

#[test]
fn test_full_invocation_with_variadic_args() {
    let (globals, puts) = (captured(), captured());
    let mut root = tree(globals, puts.clone());

    let outcome = execute(
        &mut root,
        &argv(&["put", "--id", "iq__1", "--timeout", "90s", "a.bin", "b.bin", "c.bin"]),
    )
    .unwrap();
    assert!(matches!(outcome, Outcome::Ran));

    let puts = puts.lock().unwrap();
    assert_eq!(puts.len(), 1);
    assert_eq!(puts[0].id, "iq__1");
    assert_eq!(puts[0].timeout, Duration::from_secs(90));
    assert_eq!(puts[0].replicas, None);
    // surplus tokens collapse into the trailing slice argument
    assert_eq!(puts[0].files, ["a.bin", "b.bin", "c.bin"]);
}

#[test]
fn test_persistent_flag_reaches_parent_binder() {
    let (globals, puts) = (captured(), captured());
    let mut root = tree(globals, puts.clone());

    execute(&mut root, &argv(&["put", "-i", "iq__2", "--verbose", "x"])).unwrap();
    assert_eq!(puts.lock().unwrap()[0].files, ["x"]);
    // the parent's binder holds the persistent flag's parsed value
    let registry = root.registry().unwrap();
    assert!(registry.flag("verbose").unwrap().persistent);
    assert_eq!(root.command_line().unwrap(), ["--verbose"]);
}

#[test]
fn test_required_flag_enforced() {
    let (globals, puts) = (captured(), captured());
    let mut root = tree(globals, puts);

    let err = execute(&mut root, &argv(&["put", "a.bin"])).unwrap_err();
    match err {
        CliError::MissingRequiredFlag { name } => assert_eq!(name, "id"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_run_failure_surfaces() {
    let (globals, puts) = (captured(), captured());
    let mut root = tree(globals, puts);

    // the run function rejects an empty id even when the flag is set
    let err = execute(&mut root, &argv(&["put", "--id="])).unwrap_err();
    assert!(matches!(err, CliError::Run(_)));
}

#[test]
fn test_invalid_value_is_attributed() {
    let (globals, puts) = (captured(), captured());
    let mut root = tree(globals, puts);

    let err = execute(
        &mut root,
        &argv(&["put", "--id", "iq__3", "--replicas", "many"]),
    )
    .unwrap_err();
    match err {
        CliError::Bind(BindError::InvalidValue { field, token, .. }) => {
            assert_eq!(field, "replicas");
            assert_eq!(token, "many");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_nested_group_without_run_shows_help() {
    let (globals, puts) = (captured(), captured());
    let mut root = tree(globals, puts);

    match execute(&mut root, &argv(&["admin"])).unwrap() {
        Outcome::Help(text) => assert!(text.contains("gc")),
        Outcome::Ran => panic!("admin is not runnable"),
    }

    let err = execute(&mut root, &argv(&["admin", "nope"])).unwrap_err();
    assert!(matches!(err, CliError::UnknownCommand { .. }));
}

#[test]
fn test_root_runs_with_its_own_flags() {
    let (globals, puts) = (captured(), captured());
    let mut root = tree(globals.clone(), puts);

    execute(&mut root, &argv(&["-c", "/etc/store.toml"])).unwrap();
    let globals = globals.lock().unwrap();
    assert_eq!(globals.len(), 1);
    assert_eq!(globals[0].config, "/etc/store.toml");
    assert!(!globals[0].verbose);
}
