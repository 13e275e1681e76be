use caloscope_core::{
    application::CaloscopeClient, domain::user_profile::value_objects::UpdateProfileInput,
};

use super::{render, user_error};
use crate::args::ProfileCommand;

pub async fn run(client: &CaloscopeClient, command: ProfileCommand) -> anyhow::Result<()> {
    match command {
        ProfileCommand::Show { json } => {
            let profile = client.profile.get_profile().await.map_err(user_error)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&profile)?);
            } else {
                print!("{}", render::profile(&profile));
            }
        }
        ProfileCommand::Update {
            full_name,
            age,
            gender,
            height,
            weight,
            daily_calorie_goal,
        } => {
            let input = UpdateProfileInput {
                full_name,
                age,
                gender,
                height,
                weight,
                daily_calorie_goal,
            };
            let profile = client
                .profile
                .update_profile(input)
                .await
                .map_err(user_error)?;
            println!("Profile updated.");
            print!("{}", render::profile(&profile));
        }
    }

    Ok(())
}
