//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use storefront_core::catalog::FormField;

use crate::app::{
    can_add_form_char, can_add_password_char, can_add_username_char, App, AppState, HomeTab,
    LoginFocus, Screen, PAGE_SCROLL_SIZE,
};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> bool {
    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return false;
    }

    // Handle confirmations
    if matches!(
        app.state,
        AppState::ConfirmingQuit | AppState::ConfirmingLogout | AppState::ConfirmingDelete
    ) {
        return handle_confirm_input(app, key);
    }

    // Text entry screens own every key
    match app.router.current() {
        Screen::Login => return handle_login_input(app, key),
        Screen::ProductForm(_) => {
            handle_form_input(app, key);
            return false;
        }
        Screen::Home | Screen::ProductDetail(_) => {}
    }

    // Handle search mode
    if matches!(app.state, AppState::Searching) {
        handle_search_input(app, key);
        return false;
    }

    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
            return false;
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
            return false;
        }
        _ => {}
    }

    // Any other key dismisses the last toast
    app.status_message = None;

    match app.router.current() {
        Screen::Home => handle_home_input(app, key),
        Screen::ProductDetail(id) => handle_detail_input(app, key, id),
        Screen::Login | Screen::ProductForm(_) => {}
    }
    false
}

fn handle_confirm_input(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => match app.state {
            AppState::ConfirmingQuit => {
                app.state = AppState::Quitting;
                return true;
            }
            AppState::ConfirmingLogout => {
                app.state = AppState::Normal;
                app.logout();
            }
            AppState::ConfirmingDelete => app.delete_current_product(),
            _ => app.state = AppState::Normal,
        },
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.state = AppState::Normal;
        }
        _ => {}
    }
    false
}

fn handle_search_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Normal;
            app.search_query.clear();
            app.clamp_selection();
        }
        KeyCode::Enter => {
            // Keep search query active
            app.state = AppState::Normal;
        }
        KeyCode::Backspace => {
            app.search_query.pop();
            app.product_selection = 0;
        }
        KeyCode::Char(c) if can_add_form_char(app.search_query.len(), c) => {
            app.search_query.push(c);
            // Reset selection when search changes
            app.product_selection = 0;
        }
        _ => {}
    }
}

fn handle_login_input(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc => {
            // Quit if on login screen
            app.state = AppState::Quitting;
            return true;
        }
        KeyCode::Down | KeyCode::Tab => {
            app.login_focus = match app.login_focus {
                LoginFocus::Username => LoginFocus::Password,
                LoginFocus::Password => LoginFocus::Button,
                LoginFocus::Button => LoginFocus::Username,
            };
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.login_focus = match app.login_focus {
                LoginFocus::Username => LoginFocus::Button,
                LoginFocus::Password => LoginFocus::Username,
                LoginFocus::Button => LoginFocus::Password,
            };
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Username => app.login_focus = LoginFocus::Password,
            // Enter in the password field submits, as the button does
            LoginFocus::Password | LoginFocus::Button => app.submit_login(),
        },
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Username => {
                app.login_username.pop();
            }
            LoginFocus::Password => {
                app.login_password.pop();
            }
            LoginFocus::Button => {}
        },
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Username => {
                if can_add_username_char(app.login_username.chars().count(), c) {
                    app.login_username.push(c);
                    app.login_error = None;
                }
            }
            LoginFocus::Password => {
                if can_add_password_char(app.login_password.chars().count(), c) {
                    app.login_password.push(c);
                    app.login_error = None;
                }
            }
            LoginFocus::Button => {}
        },
        _ => {}
    }
    false
}

fn handle_home_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char(c @ '1'..='9') => {
            let index = c as usize - '1' as usize;
            if let Some(tab) = HomeTab::all().get(index) {
                app.select_tab(*tab);
            }
            return;
        }
        KeyCode::Left => {
            app.select_tab(app.home_tab.prev());
            return;
        }
        KeyCode::Right => {
            app.select_tab(app.home_tab.next());
            return;
        }
        _ => {}
    }

    match app.home_tab {
        HomeTab::Category(_) => handle_products_input(app, key),
        HomeTab::Settings => {
            if key.code == KeyCode::Char('l') {
                app.state = AppState::ConfirmingLogout;
            }
        }
    }
}

fn handle_products_input(app: &mut App, key: KeyEvent) {
    let max_index = app.visible_products().len().saturating_sub(1);

    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            app.product_selection = (app.product_selection + 1).min(max_index);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.product_selection = app.product_selection.saturating_sub(1);
        }
        KeyCode::Home => {
            app.product_selection = 0;
        }
        KeyCode::End => {
            app.product_selection = max_index;
        }
        KeyCode::PageDown => {
            app.product_selection = (app.product_selection + PAGE_SCROLL_SIZE).min(max_index);
        }
        KeyCode::PageUp => {
            app.product_selection = app.product_selection.saturating_sub(PAGE_SCROLL_SIZE);
        }
        KeyCode::Enter => app.open_selected_product(),
        KeyCode::Char('n') => app.open_new_form(),
        KeyCode::Char('u') => app.refresh_products(),
        KeyCode::Char('/') => {
            app.state = AppState::Searching;
            app.search_query.clear();
        }
        KeyCode::Esc if !app.search_query.is_empty() => {
            app.search_query.clear();
            app.clamp_selection();
        }
        _ => {}
    }
}

fn handle_detail_input(app: &mut App, key: KeyEvent, id: i64) {
    match key.code {
        KeyCode::Esc | KeyCode::Backspace => app.go_back(),
        KeyCode::Char('e') if app.detail.is_some() => app.open_edit_form(),
        KeyCode::Char('d') => app.state = AppState::ConfirmingDelete,
        KeyCode::Char('u') => app.fetch_product(id),
        _ => {}
    }
}

fn handle_form_input(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('s') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.submit_form();
        return;
    }

    let position = FormField::ALL
        .iter()
        .position(|f| *f == app.form_focus)
        .unwrap_or(0);
    let last = FormField::ALL.len() - 1;

    match key.code {
        KeyCode::Esc => app.go_back(),
        KeyCode::Down | KeyCode::Tab => {
            app.form_focus = FormField::ALL[(position + 1) % FormField::ALL.len()];
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.form_focus = FormField::ALL[(position + last) % FormField::ALL.len()];
        }
        KeyCode::Enter if position == last => app.submit_form(),
        KeyCode::Enter => app.form_focus = FormField::ALL[position + 1],
        KeyCode::Backspace => {
            app.form.value_mut(app.form_focus).pop();
        }
        KeyCode::Char(c) => {
            let value = app.form.value_mut(app.form_focus);
            if can_add_form_char(value.chars().count(), c) {
                value.push(c);
            }
        }
        _ => {}
    }
}
