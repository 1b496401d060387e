use deffn::{Error, Session};
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as ReplResult};

mod debug;

const USAGE: &str = "usage: deffn [--no-prelude] [--debug] [script]";

struct Options {
    script: Option<String>,
    prelude: bool,
    debug: bool,
}

impl Options {
    fn from_args(args: impl Iterator<Item = String>) -> Result<Self, String> {
        let mut options = Options {
            script: None,
            prelude: true,
            debug: false,
        };
        for arg in args {
            match arg.as_str() {
                "--no-prelude" => options.prelude = false,
                "--debug" => options.debug = true,
                "-h" | "--help" => return Err(USAGE.to_string()),
                flag if flag.starts_with("--") => {
                    return Err(format!("unknown option {flag}\n{USAGE}"))
                }
                _ if options.script.is_some() => return Err(USAGE.to_string()),
                _ => options.script = Some(arg),
            }
        }
        Ok(options)
    }
}

fn main() -> Result<(), String> {
    let options = Options::from_args(std::env::args().skip(1))?;
    let mut session = Session::new();
    if options.prelude {
        load_prelude(&mut session)?;
    }
    match &options.script {
        None => run_repl(&mut session, options.debug).map_err(|err| err.to_string())?,
        Some(filename) => run_script(&mut session, filename, options.debug)?,
    }
    Ok(())
}

fn load_prelude(session: &mut Session) -> Result<(), String> {
    println!("Here are some functions that are already defined for you.\n");
    let signatures = session.load_prelude().map_err(|err| err.to_string())?;
    for signature in signatures {
        println!("Define {signature}");
    }
    println!();
    Ok(())
}

/// Handles one input line. Returns false once the session should end.
fn run_line(session: &mut Session, line: &str, debug: bool) -> bool {
    match line.trim() {
        "" => {}
        "exit" => return false,
        ":vars" => print!("{}", session.variables()),
        ":funcs" => print!("{}", session.functions()),
        request => {
            if debug {
                debug::dump(request, session.previous());
            }
            match session.evaluate(request) {
                Ok(outcome) => println!("{outcome}"),
                Err(err) => eprintln!("{}", describe(&err)),
            }
        }
    }
    true
}

fn describe(err: &Error) -> String {
    format!("error [{}]: {err}", err.kind())
}

fn run_script(session: &mut Session, filename: &str, debug: bool) -> Result<(), String> {
    let contents = std::fs::read_to_string(filename)
        .map_err(|_| format!("{filename} not found. No such file or directory."))?;
    for (lineno, line) in contents.lines().enumerate() {
        if debug {
            eprintln!("[line {}]", lineno + 1);
        }
        if !run_line(session, line, debug) {
            break;
        }
    }
    Ok(())
}

fn run_repl(session: &mut Session, debug: bool) -> ReplResult<()> {
    let mut rl = DefaultEditor::new()?;
    #[cfg(feature = "with-file-history")]
    if rl.load_history("history.txt").is_err() {
        println!("No previous history.");
    }
    println!("Type 'exit' to leave, ':vars' or ':funcs' to list what is defined.\n");
    let mut count = 1;
    loop {
        let readline = rl.readline(&format!("{count}: "));
        match readline {
            Ok(line) => {
                if !line.trim().is_empty() {
                    rl.add_history_entry(line.as_str())?;
                    count += 1;
                }
                if !run_line(session, &line, debug) {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }
    #[cfg(feature = "with-file-history")]
    rl.save_history("history.txt")?;
    println!("\nThe variables you inserted are as the following:\n");
    print!("{}", session.variables());
    Ok(())
}
