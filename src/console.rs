//! Terminal front end: restores or opens a session, then prints the dashboard
//! and the full grouped history of the session's vehicle.

use std::fmt::Write as _;

use crate::commands::{auth, history, parking, AppState};
use crate::config::{AppConfig, ENV_DNI, ENV_PASSWORD};
use crate::errors::AppError;
use crate::history::{HistoryRecord, HistoryView};
use crate::models::{Availability, ParkingStatus};

pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let state = AppState::from_config(&config)?;
    log::info!(
        "Backend: {} ({}), data dir {:?}",
        state.backend().name(),
        state.backend().kind(),
        config.data_dir
    );

    let mut session = auth::restore_session(&state)?;
    if !session.is_authenticated() {
        match (std::env::var(ENV_DNI), std::env::var(ENV_PASSWORD)) {
            (Ok(dni), Ok(password)) => session = auth::login(&state, &dni, &password).await?,
            _ => {
                log::warn!(
                    "No stored session; set {} and {} to sign in",
                    ENV_DNI,
                    ENV_PASSWORD
                );
                let status = parking::parking_status(&state).await?;
                print!("{}", render_status(&status));
                return Ok(());
            }
        }
    }

    let home = parking::dashboard(&state).await?;
    if let Some(name) = &home.user_name {
        println!("Hola, {}", name);
    }
    print!("{}", render_status(&home.status));
    match (&home.plate, &home.current_stay) {
        (Some(plate), Some(stay)) => println!(
            "\n{} está estacionado en {} ({}) desde las {}",
            plate,
            stay.area_name,
            stay.gate_name,
            stay.entry.datetime().format("%H:%M")
        ),
        (Some(plate), None) => println!("\n{} no está estacionado ahora.", plate),
        (None, _) => println!("\nNo tienes vehículos registrados."),
    }

    let (feed, mut view) = history::open_history(&state).await?;
    while !feed.is_exhausted() && matches!(view, HistoryView::Sections { .. }) {
        view = feed.load_more().await;
    }
    println!("\nHistorial ({})", feed.filter());
    print!("{}", render_history(&view));

    Ok(())
}

fn availability_tag(availability: Availability) -> &'static str {
    match availability {
        Availability::Plenty => "disponible",
        Availability::Few => "pocos cupos",
        Availability::None => "lleno",
    }
}

pub fn render_status(status: &ParkingStatus) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Cupos libres: {}", status.total_available());
    for area in &status.areas {
        let _ = writeln!(
            out,
            "  {} [{:?}] {}/{} libres, {}",
            area.name,
            area.status,
            area.available_spots(),
            area.total_spots,
            availability_tag(area.availability())
        );
        if !area.message.is_empty() {
            let _ = writeln!(out, "    {}", area.message);
        }
        for gate in &area.gates {
            let _ = writeln!(out, "    - {}: {}", gate.name, gate.status.label());
        }
    }
    out
}

fn render_record(record: &HistoryRecord) -> String {
    let exit = match record.exit {
        Some(exit) => exit.datetime().format("%H:%M").to_string(),
        None => "en curso".to_string(),
    };
    format!(
        "    {} → {}  {} / {}",
        record.entry.datetime().format("%H:%M"),
        exit,
        record.area_name,
        record.gate_name
    )
}

pub fn render_history(view: &HistoryView) -> String {
    let mut out = String::new();
    match view {
        HistoryView::Loading => out.push_str("  Cargando...\n"),
        HistoryView::Empty => out.push_str("  No hay registros para este filtro.\n"),
        HistoryView::Sections { sections, total, .. } => {
            if let Some(total) = total {
                let _ = writeln!(out, "  {} registros en total", total);
            }
            for section in sections {
                let _ = writeln!(out, "  {}", section.title);
                for record in &section.records {
                    let _ = writeln!(out, "{}", render_record(record));
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{group, Timestamp};
    use crate::mock::fixtures;

    #[test]
    fn test_render_status_lists_gates() {
        let text = render_status(&ParkingStatus {
            areas: fixtures::areas(),
        });
        assert!(text.starts_with("Cupos libres: 30\n"));
        assert!(text.contains("Área Sociales [Open] 2/50 libres, pocos cupos"));
        assert!(text.contains("- Puerta Venezuela: Cerrada (MAINTENANCE)"));
        assert!(text.contains("Cerrado por domingo"));
    }

    #[test]
    fn test_render_history_sections() {
        let today = chrono::NaiveDate::from_ymd_opt(2025, 11, 10).unwrap();
        let records = vec![
            HistoryRecord {
                id: "1".into(),
                area_name: "Ingenierías".into(),
                gate_name: "Puerta Paucarpata".into(),
                plate: "V1X-234".into(),
                entry: Timestamp::parse("2025-11-10 08:30").unwrap(),
                exit: None,
            },
            HistoryRecord {
                id: "2".into(),
                area_name: "Sociales".into(),
                gate_name: "Puerta Venezuela".into(),
                plate: "V1X-234".into(),
                entry: Timestamp::parse("2025-11-09 09:15").unwrap(),
                exit: Timestamp::parse("2025-11-09 16:20"),
            },
        ];
        let text = render_history(&HistoryView::Sections {
            sections: group(&records, today),
            loading_more: false,
            can_load_more: false,
            total: None,
        });
        assert_eq!(
            text,
            "  Hoy\n    08:30 → en curso  Ingenierías / Puerta Paucarpata\n  \
             Ayer\n    09:15 → 16:20  Sociales / Puerta Venezuela\n"
        );
        let counted = render_history(&HistoryView::Sections {
            sections: group(&records[..1], today),
            loading_more: false,
            can_load_more: true,
            total: Some(12),
        });
        assert!(counted.starts_with("  12 registros en total\n  Hoy\n"));
        assert_eq!(
            render_history(&HistoryView::Empty),
            "  No hay registros para este filtro.\n"
        );
    }
}
