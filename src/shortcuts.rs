//! 단축키 설정의 관리.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 단축키 설정 전체.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shortcuts {
    pub form: FormShortcuts,
    pub picker: PickerShortcuts,
    pub settings: SettingsShortcuts,
    pub modal: ModalShortcuts,
    pub wizard: WizardShortcuts,
    pub input_box: InputBoxShortcuts,
}

/// 제출 화면의 단축키.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormShortcuts {
    pub quit: Vec<String>,
    pub settings: Vec<String>,
    pub name: Vec<String>,
    pub attach: Vec<String>,
    pub remove: Vec<String>,
    pub submit: Vec<String>,
    pub week_prev: Vec<String>,
    pub week_next: Vec<String>,
    pub down: Vec<String>,
    pub up: Vec<String>,
}

/// 파일 선택 화면의 단축키.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickerShortcuts {
    pub cancel: Vec<String>,
    pub enter: Vec<String>,
    pub parent: Vec<String>,
    pub mark: Vec<String>,
    pub attach: Vec<String>,
    pub down: Vec<String>,
    pub up: Vec<String>,
}

/// 설정 화면의 단축키.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsShortcuts {
    pub cancel: Vec<String>,
    pub save: Vec<String>,
    pub script_url: Vec<String>,
    pub max_size: Vec<String>,
    pub api_key: Vec<String>,
    pub model: Vec<String>,
}

/// 결과 모달의 단축키.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModalShortcuts {
    pub upload_more: Vec<String>,
    pub finish: Vec<String>,
}

/// 초기 설정 마법사의 단축키.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WizardShortcuts {
    pub proceed: Vec<String>,
    pub skip: Vec<String>,
}

/// InputBox의 단축키.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputBoxShortcuts {
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
    pub backspace: Vec<String>,
    pub delete: Vec<String>,
    pub left: Vec<String>,
    pub right: Vec<String>,
    pub home: Vec<String>,
    pub end: Vec<String>,
    pub clear_line: Vec<String>,
}

impl Shortcuts {
    /// TOML에서 읽어 들이고, 없으면 기본값을 돌려준다.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            // 기존 파일을 읽어서 파싱한다.
            let content = std::fs::read_to_string(path)?;
            let shortcuts: Shortcuts = toml::from_str(&content)?;
            Ok(shortcuts)
        } else {
            // 아직 만들지 않았다면 기본값을 쓴다.
            Ok(Self::default())
        }
    }

    /// TOML로 저장한다.
    #[allow(dead_code)]
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        // 문자열로 직렬화한다.
        let content = toml::to_string_pretty(self)?;
        // 파일에 기록한다.
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl Default for Shortcuts {
    fn default() -> Self {
        Self {
            form: FormShortcuts {
                quit: vec!["q".into()],
                settings: vec!["t".into()],
                name: vec!["n".into()],
                attach: vec!["a".into()],
                remove: vec!["d".into()],
                submit: vec!["s".into()],
                week_prev: vec!["Left".into(), "h".into()],
                week_next: vec!["Right".into(), "l".into()],
                down: vec!["Down".into(), "j".into()],
                up: vec!["Up".into(), "k".into()],
            },
            picker: PickerShortcuts {
                cancel: vec!["Esc".into()],
                enter: vec!["Enter".into()],
                parent: vec!["Backspace".into()],
                mark: vec!["Space".into()],
                attach: vec!["a".into()],
                down: vec!["Down".into(), "j".into()],
                up: vec!["Up".into(), "k".into()],
            },
            settings: SettingsShortcuts {
                cancel: vec!["Esc".into()],
                save: vec!["Enter".into()],
                script_url: vec!["u".into()],
                max_size: vec!["m".into()],
                api_key: vec!["g".into()],
                model: vec!["o".into()],
            },
            modal: ModalShortcuts {
                upload_more: vec!["c".into()],
                finish: vec!["r".into(), "Esc".into()],
            },
            wizard: WizardShortcuts {
                proceed: vec!["Enter".into()],
                skip: vec!["Esc".into()],
            },
            input_box: InputBoxShortcuts {
                confirm: vec!["Enter".into()],
                cancel: vec!["Esc".into()],
                backspace: vec!["Backspace".into()],
                delete: vec!["Delete".into()],
                left: vec!["Left".into(), "h".into()],
                right: vec!["Right".into(), "l".into()],
                home: vec!["Home".into()],
                end: vec!["End".into()],
                clear_line: vec!["Ctrl+u".into()],
            },
        }
    }
}

/// KeyEvent가 단축키 문자열 중 하나와 일치하는지 판정한다.
pub fn matches_shortcut(key: &KeyEvent, shortcuts: &[String]) -> bool {
    shortcuts.iter().any(|s| matches_single_shortcut(key, s))
}

/// KeyEvent가 단일 단축키 문자열과 일치하는지 판정한다.
fn matches_single_shortcut(key: &KeyEvent, shortcut: &str) -> bool {
    // 단축키 문자열을 분해한다 (예: "Ctrl+u", "a", "Enter").
    let parts: Vec<&str> = shortcut.split('+').collect();

    let (modifiers_str, key_str) = if parts.len() > 1 {
        // 수식 키가 붙은 형식 (예: "Ctrl+u").
        (&parts[0..parts.len() - 1], parts[parts.len() - 1])
    } else {
        // 수식 키가 없는 형식 (예: "a", "Enter").
        (&[][..], parts[0])
    };

    // 수식 키를 해석해 기대값을 만든다.
    let mut expected_modifiers = KeyModifiers::empty();
    for modifier in modifiers_str {
        match *modifier {
            "Ctrl" | "ctrl" => expected_modifiers |= KeyModifiers::CONTROL,
            "Alt" | "alt" => expected_modifiers |= KeyModifiers::ALT,
            "Shift" | "shift" => expected_modifiers |= KeyModifiers::SHIFT,
            _ => return false,
        }
    }

    // 수식 키가 다르면 바로 불일치로 본다.
    if key.modifiers != expected_modifiers {
        return false;
    }

    // 키 코드 종류별로 일치 여부를 판정한다.
    match key_str {
        "Enter" | "enter" => key.code == KeyCode::Enter,
        "Esc" | "esc" => key.code == KeyCode::Esc,
        "Tab" | "tab" => key.code == KeyCode::Tab,
        "Backspace" | "backspace" => key.code == KeyCode::Backspace,
        "Delete" | "delete" => key.code == KeyCode::Delete,
        "Space" | "space" => key.code == KeyCode::Char(' '),
        "Up" | "up" => key.code == KeyCode::Up,
        "Down" | "down" => key.code == KeyCode::Down,
        "Left" | "left" => key.code == KeyCode::Left,
        "Right" | "right" => key.code == KeyCode::Right,
        "Home" | "home" => key.code == KeyCode::Home,
        "End" | "end" => key.code == KeyCode::End,
        // 한 글자 키는 Char로 비교한다.
        s if s.len() == 1 => {
            if let Some(c) = s.chars().next() {
                key.code == KeyCode::Char(c)
            } else {
                false
            }
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_shortcut_simple_char() {
        // 한 글자 키의 일치 판정을 검증한다.
        let key = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::empty());
        assert!(matches_shortcut(&key, &[String::from("q")]));
        assert!(!matches_shortcut(&key, &[String::from("w")]));
    }

    #[test]
    fn test_matches_shortcut_special_key() {
        // 특수 키의 일치 판정을 검증한다.
        let key = KeyEvent::new(KeyCode::Enter, KeyModifiers::empty());
        assert!(matches_shortcut(&key, &[String::from("Enter")]));
        assert!(!matches_shortcut(&key, &[String::from("Esc")]));
    }

    #[test]
    fn test_matches_shortcut_with_modifier() {
        // 수식 키가 붙은 경우의 일치 판정을 검증한다.
        let key = KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL);
        assert!(matches_shortcut(&key, &[String::from("Ctrl+u")]));
        assert!(!matches_shortcut(&key, &[String::from("u")]));
    }

    #[test]
    fn test_matches_shortcut_space_key() {
        // Space 표기가 공백 문자 키와 일치하는지 검증한다.
        let key = KeyEvent::new(KeyCode::Char(' '), KeyModifiers::empty());
        assert!(matches_shortcut(&key, &[String::from("Space")]));
        assert!(!matches_shortcut(&key, &[String::from("Enter")]));
    }

    #[test]
    fn test_matches_shortcut_arrow_keys() {
        // 방향 키의 일치 판정을 검증한다.
        let key = KeyEvent::new(KeyCode::Up, KeyModifiers::empty());
        assert!(matches_shortcut(&key, &[String::from("Up")]));
        assert!(!matches_shortcut(&key, &[String::from("Down")]));
    }

    #[test]
    fn test_matches_shortcut_multiple_keys() {
        // 복수 키 바인딩의 일치 판정을 검증한다.
        let key_up = KeyEvent::new(KeyCode::Up, KeyModifiers::empty());
        let key_k = KeyEvent::new(KeyCode::Char('k'), KeyModifiers::empty());
        let shortcuts = vec![String::from("Up"), String::from("k")];

        assert!(matches_shortcut(&key_up, &shortcuts));
        assert!(matches_shortcut(&key_k, &shortcuts));

        let key_j = KeyEvent::new(KeyCode::Char('j'), KeyModifiers::empty());
        assert!(!matches_shortcut(&key_j, &shortcuts));
    }
}
