use vant::cli::{exit_code_for, run, EXIT_INTERNAL_ERROR};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let _ = enable_ansi_support::enable_ansi_support();

    if let Err(e) = run() {
        let code = exit_code_for(&e);
        if code == EXIT_INTERNAL_ERROR {
            eprintln!("Internal error: {}", e);
            let mut source = e.source();
            if source.is_some() {
                eprintln!("\nCaused by:");
                let mut indent = 1;
                while let Some(err) = source {
                    eprintln!("{:indent$}  {}", "", err);
                    source = err.source();
                    indent += 1;
                }
            }
        } else {
            eprintln!("Error: {}", e);
        }
        std::process::exit(code);
    }
}
