use clap::Parser as ClapParser;
use conch::cli::{generate_completions, Args, Commands};
use conch::config::AppConfig;
use conch::diagnostic::{Diagnostic, DiagnosticRenderer};
use conch::interpreter::{Interpreter, Parser};
use conch::tokenizer;
use owo_colors::OwoColorize;
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Args::parse();

    if let Some(Commands::Complete { shell }) = args.command {
        generate_completions(shell);
        return ExitCode::SUCCESS;
    }

    let config = AppConfig::from_args(&args);
    verbose_log(&config, "starting conch");

    let Some(script) = &args.script else {
        error_message(&config, "no script file given");
        return ExitCode::FAILURE;
    };
    let file_name = script.display().to_string();

    let source = match read_file(script) {
        Ok(source) => source,
        Err(message) => {
            error_message(&config, &message);
            return ExitCode::FAILURE;
        }
    };
    verbose_log(&config, &format!("read {} bytes", source.len()));

    let tokens = match tokenizer::tokenize(&source) {
        Ok(tokens) => tokens,
        Err(error) => {
            return fail(&source, &file_name, &config, error.to_diagnostic());
        }
    };
    if config.verbose {
        println!("Tokens:");
        for token in &tokens {
            println!("  {}", token);
        }
    }

    let root = match Parser::new(&tokens).parse() {
        Ok(root) => root,
        Err(error) => {
            return fail(&source, &file_name, &config, error.to_diagnostic());
        }
    };
    if config.verbose {
        print!("{}", root.dump());
    }

    verbose_log(&config, "interpreting");
    let mut interpreter = Interpreter::new(&root, &config);
    if let Err(error) = interpreter.interpret() {
        return fail(&source, &file_name, &config, error.to_diagnostic());
    }

    ExitCode::SUCCESS
}

fn fail(source: &str, file_name: &str, config: &AppConfig, diagnostic: Diagnostic) -> ExitCode {
    let renderer = DiagnosticRenderer::new(source, file_name, config.color_enabled);
    eprint!("{}", renderer.render(&diagnostic));
    ExitCode::FAILURE
}

fn read_file(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("failed to read {}: {}", path.display(), e))
}

fn verbose_log(config: &AppConfig, message: &str) {
    if config.verbose {
        eprintln!("[conch:debug] {}", message);
    }
}

fn error_message(config: &AppConfig, message: &str) {
    if config.color_enabled {
        eprintln!("{}", message.red().bold());
    } else {
        eprintln!("{}", message);
    }
}
