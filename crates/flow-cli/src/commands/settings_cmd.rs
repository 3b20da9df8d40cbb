//! Settings inspection and mutation

use crate::cli::SettingsCommands;
use crate::context::AppContext;
use crate::error::CliError;

pub async fn run_settings(ctx: &AppContext, command: SettingsCommands) -> Result<(), CliError> {
    match command {
        SettingsCommands::Show => {
            let settings = ctx.engine.settings().await;
            println!("font-size: {}px", settings.font_size);
            println!("font:      {:?}", settings.font_family);
            println!("theme:     {:?}", settings.theme);
            println!("zen-mode:  {}", if settings.is_zen_mode { "on" } else { "off" });
        }
        SettingsCommands::Set {
            font_size,
            font,
            theme,
            zen,
        } => {
            let mut settings = ctx.engine.settings().await;
            if let Some(size) = font_size {
                settings.set_font_size(size);
            }
            if let Some(font) = font {
                settings.font_family = font.into();
            }
            if let Some(theme) = theme {
                settings.theme = theme.into();
            }
            if let Some(zen) = zen {
                settings.is_zen_mode = zen;
            }

            ctx.engine.update_settings(settings).await?;
            println!(
                "Saved: {}px {:?} {:?} zen={}",
                settings.font_size, settings.font_family, settings.theme, settings.is_zen_mode
            );
        }
    }
    Ok(())
}
