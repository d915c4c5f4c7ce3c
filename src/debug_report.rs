use retort::{Reply, RunResult};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

pub fn print_run(input: &str, run: &RunResult, color: bool, all: bool) {
    let palette = ansi::Palette::new(color);
    println!("\n{}", palette.bold(palette.paint(format!("⚙  Matching: \"{}\"", input.trim()), ansi::CYAN)));

    // Replies
    println!("\n{}", palette.paint("━━━ Replies ━━━", ansi::GRAY));
    if run.replies.is_empty() {
        println!("{}", palette.dim("  No rule matched"));
        println!("\n{}", palette.paint("Possible reasons:", ansi::YELLOW));
        println!("  • No rule input covers the full utterance");
        println!("  • Every satisfied template failed to expand");
        println!("  • A self-recursive rule tripped the loop detector");
        println!("\n{}", palette.dim("  Tip: Set RETORT_DEBUG_MATCH=1 to see terminal/expansion traces"));
    } else if all {
        for (idx, reply) in run.replies.iter().enumerate() {
            print_reply(idx, reply, &palette);
        }
    } else {
        print_reply(0, &run.replies[0], &palette);
        if run.replies.len() > 1 {
            println!("  {}", palette.dim(format!("... +{} lower-scored (use --all)", run.replies.len() - 1)));
        }
    }

    // Timing
    println!("\n{}", palette.paint("━━━ Timing ━━━", ansi::GRAY));
    println!(
        "  Total: {}  │  Tokenise: {}  │  Search: {}",
        palette.paint(format!("{:?}", run.metrics.total), ansi::GREEN),
        palette.dim(format!("{:?}", run.metrics.tokenize)),
        palette.paint(format!("{:?}", run.metrics.search), ansi::CYAN),
    );
    println!(
        "  Edges weighed: {}  │  Terminals: {}  │  Failed expansions: {}",
        palette.paint(run.metrics.nodes_visited.to_string(), ansi::BLUE),
        palette.paint(run.metrics.terminals_reached.to_string(), ansi::BLUE),
        if run.metrics.failed_expansions > 0 {
            palette.paint(run.metrics.failed_expansions.to_string(), ansi::YELLOW)
        } else {
            palette.dim("0")
        },
    );
    println!();
}

fn print_reply(idx: usize, reply: &Reply, palette: &ansi::Palette) {
    println!(
        "  {} {} {} {}",
        palette.paint(format!("[{}]", idx), ansi::GRAY),
        palette.bold(palette.paint(&reply.text, ansi::GREEN)),
        palette.dim("│"),
        palette.paint(format!("score {:.3}", reply.score), ansi::YELLOW),
    );
    println!(
        "      {} {}  {} {}",
        palette.dim("rule:"),
        palette.paint(reply.rule_id.to_string(), ansi::CYAN),
        palette.dim("│ input:"),
        palette.paint(reply.input_index.to_string(), ansi::BLUE),
    );
}
