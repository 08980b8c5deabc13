use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

pub fn rule() -> String {
    "-".repeat(60)
}

pub fn percent(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}
