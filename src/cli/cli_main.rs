use super::cli_plasma_ivp::{plasma_ivp_menu, run_task_file};
use crate::Examples::plasma_examples::plasma_examples;
use std::io::{self, Write};

pub fn run_interactive_menu() {
    loop {
        show_main_menu();
        let choice = get_user_input();

        match choice.trim() {
            "1" => plasma_ivp_menu(),
            "2" => {
                print!("\x1b[36mTask file: \x1b[0m");
                let _ = io::stdout().flush();
                let file = get_user_input();
                if let Err(e) = run_task_file(file.trim()) {
                    println!("\x1b[31mError: {}\x1b[0m", e);
                }
            }
            "3" => examples_menu(),
            "0" => {
                println!("Goodbye!");
                break;
            }
            _ => println!("Invalid choice. Please try again."),
        }
    }
}
/* colors
Blue (\x1b[34m) - header
Yellow (\x1b[33m) - menu options
Cyan (\x1b[36m) - prompts
Red (\x1b[31m) - errors
*/
fn show_main_menu() {
    println!(
        "\x1b[34m\n PlasmaNH3: kinetics of ammonia synthesis in a non-thermal N2/H2 plasma\n \x1b[0m"
    );
    println!("\x1b[33m1. Plasma kinetics (simulation, sensitivity)\x1b[0m");
    println!("\x1b[33m2. Run task file\x1b[0m");
    println!("\x1b[33m3. Examples\x1b[0m");
    println!("\x1b[33m0. Exit\x1b[0m");
    print!("\x1b[36mEnter your choice: \x1b[0m");
    let _ = io::stdout().flush();
}

fn examples_menu() {
    loop {
        println!("\n=== Examples ===");
        println!("1. Rate coefficients at default sliders");
        println!("2. Reference simulation (T_e = 2 eV, 1000 s)");
        println!("3. Sensitivity sweep");
        println!("4. Catalyst enhancement");
        println!("5. User rate table with formulas");
        println!("0. Back to main menu");
        print!("Enter your choice: ");
        let _ = io::stdout().flush();

        let choice = get_user_input();
        match choice.trim() {
            "1" => plasma_examples(0),
            "2" => plasma_examples(1),
            "3" => plasma_examples(2),
            "4" => plasma_examples(3),
            "5" => plasma_examples(4),
            "0" => break,
            _ => println!("Invalid choice. Please try again."),
        }
    }
}

fn get_user_input() -> String {
    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        input.clear();
    }
    input
}
