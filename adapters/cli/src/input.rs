use tilewalk_simulation::PlayerInput;

/// Parses a set of held keys written as any combination of `w`, `a`, `s`, `d`.
pub(crate) fn parse_hold(keys: &str) -> Result<PlayerInput, String> {
    let mut input = PlayerInput::IDLE;
    for key in keys.chars() {
        match key.to_ascii_lowercase() {
            'w' => input.up = true,
            'a' => input.left = true,
            's' => input.down = true,
            'd' => input.right = true,
            other => return Err(format!("unknown key `{other}`, expected w, a, s or d")),
        }
    }
    Ok(input)
}
