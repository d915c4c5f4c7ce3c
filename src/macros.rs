#[macro_export]
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).unwrap());
        &*RE
    }};
}

#[macro_export]
macro_rules! rule {
    (
        id: $id:expr,
        inputs: [ $($input:expr),* $(,)? ],
        output: $output:expr $(,)?
    ) => {{
        $crate::Rule {
            id: $id,
            inputs: vec![ $($input.to_string()),* ],
            output: $output,
        }
    }};
}
