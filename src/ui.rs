use std::io::{Stdout, Write};

use crossterm::{
    cursor::MoveTo,
    event::{Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::{Print, Stylize},
    terminal::{self, Clear, ClearType},
};

use cardsched::{CardId, CardMemoryState, Grade};

fn title(stdout: &mut Stdout, columns: u16) -> anyhow::Result<()> {
    let header_text = "CARDSCHED\r\n\n";
    execute!(
        stdout,
        MoveTo(
            columns.saturating_sub(header_text.len().try_into().unwrap_or(u16::MAX)) / 2,
            0
        ),
        Print(header_text.red()),
    )?;
    Ok(())
}

fn print_card(stdout: &mut Stdout, id: CardId, card: Option<&CardMemoryState>) -> anyhow::Result<()> {
    let status = match card {
        Some(card) => format!("{}, {} reviews, {} lapses", card.state, card.reps, card.lapses),
        None => "new".to_string(),
    };
    execute!(
        stdout,
        Print("REVIEW: ".yellow()),
        Print(format!("__{id} ({status})\r\n\n"))
    )?;
    Ok(())
}

/// Asks for a grade on the terminal. `None` when the user quits.
pub fn prompt_grade(id: CardId, card: Option<&CardMemoryState>) -> anyhow::Result<Option<Grade>> {
    terminal::enable_raw_mode()?;
    let grade = read_grade(id, card);
    terminal::disable_raw_mode()?;
    println!();
    grade
}

fn read_grade(id: CardId, card: Option<&CardMemoryState>) -> anyhow::Result<Option<Grade>> {
    let mut stdout = std::io::stdout();
    let mut columns = terminal::size()?.0;

    loop {
        execute!(&mut stdout, MoveTo(0, 0), Clear(ClearType::All))?;
        title(&mut stdout, columns)?;
        print_card(&mut stdout, id, card)?;
        print!("1: forgot\t2: hard\t3/space: good\t4: easy");
        stdout.flush()?;

        match crossterm::event::read()? {
            Event::Key(
                KeyEvent {
                    code: KeyCode::Esc | KeyCode::Char('q'),
                    ..
                }
                | KeyEvent {
                    code: KeyCode::Char('c'),
                    modifiers: KeyModifiers::CONTROL,
                    ..
                },
            ) => return Ok(None),
            Event::Key(event) => {
                let grade = match event.code {
                    KeyCode::Char('1') => Grade::Forgot,
                    KeyCode::Char('2') => Grade::Hard,
                    KeyCode::Char('3' | ' ') => Grade::Good,
                    KeyCode::Char('4') => Grade::Easy,
                    _ => continue,
                };
                return Ok(Some(grade));
            }
            Event::Resize(width, _) => {
                columns = width;
            }
            _ => {}
        }
    }
}
