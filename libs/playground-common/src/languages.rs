// Static catalog of the languages the playground offers

use serde::Serialize;

pub const DEFAULT_LANGUAGE: &str = "python";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LanguageConfig {
    pub id: &'static str,
    pub display_name: &'static str,
    pub editor_mode: &'static str,
    pub sample: &'static str,
}

static LANGUAGES: [LanguageConfig; 10] = [
    LanguageConfig {
        id: "python",
        display_name: "Python",
        editor_mode: "python",
        sample: r#"# Python Hello World
def greet(name):
    return f"Hello, {name}!"

print(greet("World"))
"#,
    },
    LanguageConfig {
        id: "javascript",
        display_name: "JavaScript",
        editor_mode: "javascript",
        sample: r#"// JavaScript Hello World
function greet(name) {
    return `Hello, ${name}!`;
}

console.log(greet("World"));
"#,
    },
    LanguageConfig {
        id: "typescript",
        display_name: "TypeScript",
        editor_mode: "typescript",
        sample: r#"// TypeScript Hello World
function greet(name: string): string {
    return `Hello, ${name}!`;
}

console.log(greet("World"));
"#,
    },
    LanguageConfig {
        id: "java",
        display_name: "Java",
        editor_mode: "java",
        sample: r#"// Java Hello World
public class Main {
    public static void main(String[] args) {
        System.out.println(greet("World"));
    }

    public static String greet(String name) {
        return "Hello, " + name + "!";
    }
}
"#,
    },
    LanguageConfig {
        id: "cpp",
        display_name: "C++",
        editor_mode: "cpp",
        sample: r#"// C++ Hello World
#include <iostream>
#include <string>

std::string greet(const std::string& name) {
    return "Hello, " + name + "!";
}

int main() {
    std::cout << greet("World") << std::endl;
    return 0;
}
"#,
    },
    LanguageConfig {
        id: "c",
        display_name: "C",
        editor_mode: "c",
        sample: r#"// C Hello World
#include <stdio.h>

void greet(const char* name) {
    printf("Hello, %s!\n", name);
}

int main() {
    greet("World");
    return 0;
}
"#,
    },
    LanguageConfig {
        id: "go",
        display_name: "Go",
        editor_mode: "go",
        sample: r#"// Go Hello World
package main

import "fmt"

func greet(name string) string {
    return fmt.Sprintf("Hello, %s!", name)
}

func main() {
    fmt.Println(greet("World"))
}
"#,
    },
    LanguageConfig {
        id: "rust",
        display_name: "Rust",
        editor_mode: "rust",
        sample: r#"// Rust Hello World
fn greet(name: &str) -> String {
    format!("Hello, {}!", name)
}

fn main() {
    println!("{}", greet("World"));
}
"#,
    },
    LanguageConfig {
        id: "ruby",
        display_name: "Ruby",
        editor_mode: "ruby",
        sample: r#"# Ruby Hello World
def greet(name)
  "Hello, #{name}!"
end

puts greet("World")
"#,
    },
    LanguageConfig {
        id: "php",
        display_name: "PHP",
        editor_mode: "php",
        sample: r#"<?php
// PHP Hello World
function greet($name) {
    return "Hello, " . $name . "!";
}

echo greet("World") . "\n";
?>
"#,
    },
];

/// Look up a language by identifier
pub fn get(id: &str) -> Option<&'static LanguageConfig> {
    LANGUAGES.iter().find(|lang| lang.id == id)
}

/// Every registered language, in menu order
pub fn all() -> &'static [LanguageConfig] {
    &LANGUAGES
}

/// Snippet used to pre-populate the editor when nothing is saved
pub fn sample(id: &str) -> Option<&'static str> {
    get(id).map(|lang| lang.sample)
}

/// The entry for [`DEFAULT_LANGUAGE`].
pub fn default_language() -> &'static LanguageConfig {
    &LANGUAGES[0]
}

pub fn contains(id: &str) -> bool {
    get(id).is_some()
}
