//! 첨부 파일을 고르는 디렉터리 탐색 상태.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// 탐색 목록의 항목 1건.
#[derive(Clone, Debug)]
pub struct PickerEntry {
    pub path: PathBuf,
    pub name: String,
    pub is_dir: bool,
    pub size: u64,
}

/// 파일 선택 화면의 상태.
#[derive(Clone, Debug)]
pub struct PickerState {
    /// 현재 탐색 중인 디렉터리.
    pub cwd: PathBuf,
    /// 표시 중인 항목. 디렉터리를 먼저, 이후 이름순으로 정렬한다.
    pub entries: Vec<PickerEntry>,
    /// 선택 행.
    pub selected: usize,
    /// 마킹된 파일 경로. 고른 순서를 유지한다.
    pub marked: Vec<PathBuf>,
}

impl PickerState {
    /// 주어진 디렉터리에서 시작하는 상태를 만든다.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        let mut state = Self {
            cwd: cwd.into(),
            entries: vec![],
            selected: 0,
            marked: vec![],
        };
        // 읽기에 실패해도 빈 목록으로 시작할 수 있게 한다.
        let _ = state.refresh();
        state
    }

    /// 현재 디렉터리를 다시 읽는다. 숨김 항목은 표시하지 않는다.
    pub fn refresh(&mut self) -> Result<()> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(&self.cwd)
            .with_context(|| format!("디렉터리를 읽을 수 없음: {}", self.cwd.display()))?
        {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            // 메타데이터를 읽지 못한 항목(깨진 링크 등)은 건너뛴다.
            let Ok(meta) = entry.metadata() else {
                continue;
            };
            entries.push(PickerEntry {
                path: entry.path(),
                name,
                is_dir: meta.is_dir(),
                size: meta.len(),
            });
        }

        entries.sort_by(|a, b| {
            b.is_dir
                .cmp(&a.is_dir)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });
        self.entries = entries;
        self.selected = 0;
        Ok(())
    }

    /// 선택 중인 항목.
    pub fn current(&self) -> Option<&PickerEntry> {
        self.entries.get(self.selected)
    }

    pub fn move_down(&mut self) {
        if self.selected + 1 < self.entries.len() {
            self.selected += 1;
        }
    }

    pub fn move_up(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    /// 선택 항목이 디렉터리라면 안으로 들어간다.
    pub fn enter(&mut self) -> Result<()> {
        if let Some(e) = self.current()
            && e.is_dir
        {
            self.cwd = e.path.clone();
            self.refresh()?;
        }
        Ok(())
    }

    /// 상위 디렉터리로 이동한다. 루트에서는 아무것도 하지 않는다.
    pub fn parent(&mut self) -> Result<()> {
        if let Some(parent) = self.cwd.parent().map(Path::to_path_buf) {
            self.cwd = parent;
            self.refresh()?;
        }
        Ok(())
    }

    /// 선택 중인 파일의 마킹을 토글한다. 디렉터리는 대상이 아니다.
    pub fn toggle_mark(&mut self) {
        let Some(e) = self.current() else {
            return;
        };
        if e.is_dir {
            return;
        }
        let path = e.path.clone();
        if let Some(pos) = self.marked.iter().position(|p| *p == path) {
            self.marked.remove(pos);
        } else {
            self.marked.push(path);
        }
    }

    pub fn is_marked(&self, path: &Path) -> bool {
        self.marked.iter().any(|p| p == path)
    }

    /// 첨부할 경로 묶음을 꺼낸다. 마킹이 없으면 선택 중인 파일 하나를 쓴다.
    pub fn take_batch(&mut self) -> Vec<PathBuf> {
        if self.marked.is_empty() {
            if let Some(e) = self.current()
                && !e.is_dir
            {
                return vec![e.path.clone()];
            }
            return vec![];
        }
        std::mem::take(&mut self.marked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 테스트용 디렉터리 구조를 만든다.
    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("homework-picker-{tag}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(dir.join("zz_sub")).unwrap();
        std::fs::write(dir.join("b.txt"), b"bb").unwrap();
        std::fs::write(dir.join("A.jpg"), b"aaaa").unwrap();
        std::fs::write(dir.join(".hidden"), b"x").unwrap();
        dir
    }

    #[test]
    fn test_refresh_sorts_dirs_first_and_skips_hidden() {
        let dir = scratch_dir("sort");
        let state = PickerState::new(&dir);
        let names: Vec<_> = state.entries.iter().map(|e| e.name.as_str()).collect();
        // 디렉터리가 앞, 파일은 대소문자 무시 이름순.
        assert_eq!(names, vec!["zz_sub", "A.jpg", "b.txt"]);
        assert!(state.entries[0].is_dir);
    }

    #[test]
    fn test_enter_and_parent_move_between_dirs() {
        let dir = scratch_dir("nav");
        let mut state = PickerState::new(&dir);
        // 첫 항목이 디렉터리이므로 바로 들어갈 수 있다.
        state.enter().unwrap();
        assert_eq!(state.cwd, dir.join("zz_sub"));
        assert!(state.entries.is_empty());

        state.parent().unwrap();
        assert_eq!(state.cwd, dir);
        assert_eq!(state.entries.len(), 3);
    }

    #[test]
    fn test_take_batch_prefers_marked_files() {
        let dir = scratch_dir("batch");
        let mut state = PickerState::new(&dir);

        // 마킹이 없으면 선택 중인 파일 하나만 돌려준다.
        state.move_down();
        let single = state.take_batch();
        assert_eq!(single, vec![dir.join("A.jpg")]);

        // 마킹 순서가 배치 순서가 된다.
        state.selected = 2;
        state.toggle_mark();
        state.selected = 1;
        state.toggle_mark();
        let batch = state.take_batch();
        assert_eq!(batch, vec![dir.join("b.txt"), dir.join("A.jpg")]);
        // 꺼낸 뒤에는 마킹이 비워진다.
        assert!(state.marked.is_empty());
    }

    #[test]
    fn test_directories_cannot_be_marked() {
        let dir = scratch_dir("dirmark");
        let mut state = PickerState::new(&dir);
        // 선택 행 0은 디렉터리라서 마킹되지 않는다.
        state.toggle_mark();
        assert!(state.marked.is_empty());
        // 디렉터리 선택 상태의 빈 배치는 빈 목록이다.
        assert!(state.take_batch().is_empty());
    }
}
