//! A small conversational pack exercising every pattern form: literals,
//! wildcards, variables with conditional outputs, and recursive re-dispatch.

use crate::{Condition, OutputList, Rule};

/// All smalltalk rules, in priority-neutral order.
pub(crate) fn get() -> Vec<Rule> {
    vec![
        rule_greeting(),
        rule_name_capture(),
        rule_how_are_you(),
        rule_echo(),
        rule_re_ask(),
        rule_farewell(),
        rule_fallback(),
    ]
}

/// "hello", "hi there", "hey you", ...
fn rule_greeting() -> Rule {
    rule! {
        id: 1,
        inputs: ["hello", "hello *", "hi", "hi *", "hey", "hey *"],
        output: OutputList::always("hi there"),
    }
}

/// "my name is Ada", "i am called Grace", with a conditional easter egg
/// for machine-sounding names.
fn rule_name_capture() -> Rule {
    rule! {
        id: 2,
        inputs: ["my name is [name]", "i am called [name]"],
        output: OutputList::builder()
            .when(
                Condition::Matches("name".into(), regex!(r"(?i)^(hal|bot|robot)$")),
                "a fine name for a machine, [name]",
            )
            .otherwise("nice to meet you, [name]"),
    }
}

/// "how are you", "how are you today"
fn rule_how_are_you() -> Rule {
    rule! {
        id: 3,
        inputs: ["how are you", "how are you *"],
        output: OutputList::always("doing well, thanks for asking"),
    }
}

/// "say good morning": echoes the capture verbatim.
fn rule_echo() -> Rule {
    rule! {
        id: 4,
        inputs: ["say [words]"],
        output: OutputList::always("[words]"),
    }
}

/// "ask hello": re-dispatches the capture through the engine.
fn rule_re_ask() -> Rule {
    rule! {
        id: 5,
        inputs: ["ask [q]", "what about [q]"],
        output: OutputList::always("they would say: ~[q]"),
    }
}

/// "bye", "goodbye for now"
fn rule_farewell() -> Rule {
    rule! {
        id: 6,
        inputs: ["bye", "bye *", "goodbye", "goodbye *"],
        output: OutputList::always("see you soon"),
    }
}

/// Catch-all; the low wildcard weight keeps it below every real match.
fn rule_fallback() -> Rule {
    rule! {
        id: 7,
        inputs: ["+"],
        output: OutputList::always("tell me more"),
    }
}
