use super::Result;

pub async fn execute() -> Result<()> {
    let client = super::open_client()?;
    let employees = super::wrap_in_spinner(client.get_employees()).await?;
    super::save_session(&client)?;

    for employee in employees {
        println!("{employee}");
    }
    Ok(())
}
