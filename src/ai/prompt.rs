//! Prompt text for each insight request.

pub fn explain_prompt(expression: &str, result: &str) -> String {
    format!(
        "I just calculated {} and got {}. Can you provide a clear, step-by-step mathematical \
         explanation of how this works, any interesting properties of this result, or practical \
         applications?",
        expression, result
    )
}

pub fn word_problem_prompt(problem: &str) -> String {
    format!(
        "Solve this math word problem and provide the numeric answer along with an explanation: \"{}\"",
        problem
    )
}
