//! 제출 폼 모델: 첨부 파일, 파일 접수 검사, 제출 상태 기계.

use std::path::PathBuf;
use std::time::SystemTime;

use anyhow::{Context, Result};

use crate::weeks;

/// 업로드 대상으로 고른 파일 1건.
#[derive(Clone, Debug)]
pub struct AttachedFile {
    /// 디스크 상의 경로. 실제 바이트는 업로드 단계에서 읽는다.
    pub path: PathBuf,
    /// 표시용 파일명.
    pub name: String,
    /// 확장자에서 추정한 MIME 타입.
    pub mime_type: String,
    /// 원본 크기(바이트). 접수 검사 기준은 압축 전의 이 값이다.
    pub size: u64,
    /// 마지막 수정 시각. 중복 판정 키의 일부.
    pub modified: SystemTime,
}

impl AttachedFile {
    /// 경로에서 메타데이터를 읽어 첨부 파일을 만든다.
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        // 크기와 수정 시각을 한 번에 읽는다.
        let meta = std::fs::metadata(&path)
            .with_context(|| format!("파일 정보를 읽을 수 없음: {}", path.display()))?;
        let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);

        // 파일명이 없으면 대체 이름을 쓴다.
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("untitled")
            .to_string();

        // 확장자 기준으로 MIME을 추정하고, 모르면 octet-stream으로 둔다.
        let mime_type = mime_guess::from_path(&path)
            .first_raw()
            .unwrap_or("application/octet-stream")
            .to_string();

        Ok(Self {
            path,
            name,
            mime_type,
            size: meta.len(),
            modified,
        })
    }

    /// (이름, 크기, 수정 시각) 세 값이 전부 같아야 같은 첨부로 본다.
    fn same_identity(&self, other: &AttachedFile) -> bool {
        self.name == other.name && self.size == other.size && self.modified == other.modified
    }

    /// 화면 표시용 크기(MB, 소수점 둘째 자리).
    pub fn size_mb(&self) -> String {
        format!("{:.2} MB", self.size as f64 / 1024.0 / 1024.0)
    }
}

/// 접수 단계에서 파일이 거절된 사유.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectReason {
    /// 설정된 최대 크기를 초과.
    Oversize,
    /// 기존 선택이나 같은 배치 안에 이미 같은 파일이 있음.
    Duplicate,
}

/// 거절된 파일 1건에 대한 안내 정보.
#[derive(Clone, Debug)]
pub struct Rejection {
    pub file_name: String,
    pub reason: RejectReason,
}

impl Rejection {
    /// 사용자에게 보여 줄 안내 문구를 만든다.
    pub fn notice(&self, max_mb: u64) -> String {
        match self.reason {
            RejectReason::Oversize => format!(
                "'{}' 파일 크기가 {}MB를 초과하여 제외되었습니다.",
                self.file_name, max_mb
            ),
            RejectReason::Duplicate => {
                format!("'{}'은(는) 이미 목록에 추가된 파일입니다.", self.file_name)
            }
        }
    }
}

/// 작성 중인 제출 내용.
#[derive(Clone, Debug, Default)]
pub struct Submission {
    /// 훈련생 이름.
    pub name: String,
    /// 선택한 주차 id. 빈 문자열이면 미선택.
    pub week_id: String,
    /// 첨부 파일 목록. 순서가 업로드 순서이자 표시 순서다.
    pub files: Vec<AttachedFile>,
}

impl Submission {
    /// 제출 가능 조건: 이름이 있고, 유효한 주차가 선택되고, 파일이 1개 이상.
    pub fn is_valid(&self) -> bool {
        !self.name.is_empty() && weeks::is_valid_id(&self.week_id) && !self.files.is_empty()
    }

    /// 새로 고른 파일 배치를 검사해서 통과분만 뒤에 붙인다.
    ///
    /// 크기 초과와 (이름, 크기, 수정 시각) 중복은 건별로 거절 목록에
    /// 담아 돌려주고, 나머지 파일의 접수를 막지 않는다. 수동 선택이든
    /// 여러 개 일괄 선택이든 같은 경로로 들어온다.
    pub fn admit_files(&mut self, picked: Vec<AttachedFile>, max_mb: u64) -> Vec<Rejection> {
        let limit = max_mb * 1024 * 1024;
        let mut rejected = Vec::new();
        let mut accepted: Vec<AttachedFile> = Vec::new();

        for file in picked {
            // 1. 크기 검사. 한도는 원본(압축 전) 크기에 적용한다.
            if file.size > limit {
                rejected.push(Rejection {
                    file_name: file.name.clone(),
                    reason: RejectReason::Oversize,
                });
                continue;
            }

            // 2. 중복 검사. 기존 선택과 같은 배치의 앞선 파일 모두와 비교한다.
            let duplicate = self.files.iter().any(|f| f.same_identity(&file))
                || accepted.iter().any(|f| f.same_identity(&file));
            if duplicate {
                rejected.push(Rejection {
                    file_name: file.name.clone(),
                    reason: RejectReason::Duplicate,
                });
                continue;
            }

            accepted.push(file);
        }

        // 기존 순서를 유지한 채 통과분을 받은 순서대로 덧붙인다.
        self.files.extend(accepted);
        rejected
    }

    /// 목록에서 파일 하나를 뺀다. 순수한 배열 편집이다.
    pub fn remove_file(&mut self, index: usize) -> Option<AttachedFile> {
        if index < self.files.len() {
            Some(self.files.remove(index))
        } else {
            None
        }
    }
}

/// 제출 성공 시 보여 줄 결과.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Feedback {
    /// 접수 안내(파일명 또는 "첫 파일 외 N건").
    pub message: String,
    /// 격려 문구.
    pub encouragement: String,
}

/// 파일 목록을 안내 문구로 줄인다. 1건이면 파일명 그대로, 여러 건이면 "외 N건".
pub fn summarize_files(files: &[AttachedFile]) -> String {
    match files {
        [] => String::new(),
        [one] => one.name.clone(),
        [first, rest @ ..] => format!("{} 외 {}건", first.name, rest.len()),
    }
}

/// 제출 흐름의 전체 상태.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum SubmitStatus {
    /// 작성 중.
    #[default]
    Idle,
    /// 업로드 진행 중.
    Uploading,
    /// 모든 파일 전송 완료. 피드백은 이 상태에서만 존재한다.
    Success(Feedback),
    /// 전송 실패. 재제출은 초기화 후에만 가능하다.
    Error(String),
}

/// 제출 내용 + 상태 + 진행률을 묶은 폼 상태 기계.
#[derive(Clone, Debug, Default)]
pub struct SubmitFlow {
    pub submission: Submission,
    pub status: SubmitStatus,
    /// 워커가 보내오는 전체 진행률(0..=100).
    pub pct: u8,
}

impl SubmitFlow {
    /// Idle에서 유효성 검사를 통과했을 때만 Uploading으로 넘어간다.
    pub fn begin_upload(&mut self) -> bool {
        if self.status != SubmitStatus::Idle || !self.submission.is_valid() {
            return false;
        }
        self.status = SubmitStatus::Uploading;
        self.pct = 0;
        true
    }

    /// 업로드 성공. 최종 진행률은 반올림 오차와 무관하게 100으로 못 박는다.
    pub fn finish_success(&mut self, feedback: Feedback) {
        if self.status == SubmitStatus::Uploading {
            self.status = SubmitStatus::Success(feedback);
            self.pct = 100;
        }
    }

    /// 업로드 실패. 부분 성공 상태는 노출하지 않는다.
    pub fn finish_error(&mut self, error: String) {
        if self.status == SubmitStatus::Uploading {
            self.status = SubmitStatus::Error(error);
        }
    }

    /// 전체 초기화: 이름/주차/파일과 상태, 진행률, 피드백을 모두 비운다.
    pub fn reset_full(&mut self) {
        self.submission = Submission::default();
        self.status = SubmitStatus::Idle;
        self.pct = 0;
    }

    /// 이어서 제출: 이름/주차는 남기고 파일과 상태, 진행률, 피드백만 비운다.
    pub fn reset_continue(&mut self) {
        self.submission.files.clear();
        self.status = SubmitStatus::Idle;
        self.pct = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    /// 테스트용 첨부 파일을 만든다(디스크 접근 없음).
    fn tf(name: &str, size: u64, modified_secs: u64) -> AttachedFile {
        AttachedFile {
            path: PathBuf::from(format!("/tmp/{name}")),
            name: name.to_string(),
            mime_type: "application/octet-stream".to_string(),
            size,
            modified: SystemTime::UNIX_EPOCH + Duration::from_secs(modified_secs),
        }
    }

    #[test]
    fn test_admit_rejects_oversize() {
        // 한도를 넘는 파일은 거절되고 목록 길이는 그대로다.
        let mut s = Submission::default();
        let rejected = s.admit_files(vec![tf("big.pdf", 11 * 1024 * 1024, 1)], 10);
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].reason, RejectReason::Oversize);
        assert!(s.files.is_empty());

        // 정확히 한도까지는 통과한다.
        let rejected = s.admit_files(vec![tf("edge.pdf", 10 * 1024 * 1024, 2)], 10);
        assert!(rejected.is_empty());
        assert_eq!(s.files.len(), 1);
    }

    #[test]
    fn test_admit_rejects_duplicate_same_batch() {
        // 같은 배치 안의 중복은 첫 건만 남는다.
        let mut s = Submission::default();
        let rejected = s.admit_files(vec![tf("a.jpg", 100, 1), tf("a.jpg", 100, 1)], 10);
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].reason, RejectReason::Duplicate);
        assert_eq!(s.files.len(), 1);
    }

    #[test]
    fn test_admit_rejects_duplicate_across_batches() {
        // 이전 배치에서 받은 파일과 같은 세쌍둥이 키는 나중 배치에서도 거절된다.
        let mut s = Submission::default();
        s.admit_files(vec![tf("a.jpg", 100, 1)], 10);
        let rejected = s.admit_files(vec![tf("a.jpg", 100, 1)], 10);
        assert_eq!(rejected.len(), 1);
        assert_eq!(s.files.len(), 1);
    }

    #[test]
    fn test_admit_triple_must_match_exactly() {
        // 이름이 같아도 크기나 수정 시각이 다르면 다른 파일이다.
        let mut s = Submission::default();
        s.admit_files(vec![tf("a.jpg", 100, 1)], 10);
        let rejected = s.admit_files(vec![tf("a.jpg", 101, 1), tf("a.jpg", 100, 2)], 10);
        assert!(rejected.is_empty());
        assert_eq!(s.files.len(), 3);
    }

    #[test]
    fn test_admit_keeps_valid_files_in_mixed_batch() {
        // 거절 건이 있어도 나머지 파일 접수를 막지 않는다.
        let mut s = Submission::default();
        s.admit_files(vec![tf("old.pdf", 50, 1)], 10);
        let rejected = s.admit_files(
            vec![
                tf("big.mov", 20 * 1024 * 1024, 2),
                tf("ok1.jpg", 100, 3),
                tf("old.pdf", 50, 1),
                tf("ok2.jpg", 200, 4),
            ],
            10,
        );
        assert_eq!(rejected.len(), 2);
        // 받은 순서 그대로 기존 목록 뒤에 붙는다.
        let names: Vec<_> = s.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["old.pdf", "ok1.jpg", "ok2.jpg"]);
    }

    #[test]
    fn test_rejection_notices() {
        // 안내 문구에 파일명과 사유가 들어간다.
        let r = Rejection {
            file_name: "big.mov".into(),
            reason: RejectReason::Oversize,
        };
        assert_eq!(
            r.notice(10),
            "'big.mov' 파일 크기가 10MB를 초과하여 제외되었습니다."
        );
        let r = Rejection {
            file_name: "a.jpg".into(),
            reason: RejectReason::Duplicate,
        };
        assert_eq!(r.notice(10), "'a.jpg'은(는) 이미 목록에 추가된 파일입니다.");
    }

    #[test]
    fn test_remove_file_is_structural() {
        // 지정한 칸만 빠지고 나머지 순서는 그대로 당겨진다.
        let mut s = Submission::default();
        s.admit_files(vec![tf("a", 1, 1), tf("b", 2, 2), tf("c", 3, 3)], 10);
        let removed = s.remove_file(1);
        assert_eq!(removed.unwrap().name, "b");
        let names: Vec<_> = s.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
        // 범위 밖 인덱스는 아무것도 하지 않는다.
        assert!(s.remove_file(9).is_none());
    }

    #[test]
    fn test_validity_gate() {
        let mut s = Submission::default();
        assert!(!s.is_valid());
        s.name = "홍길동".into();
        assert!(!s.is_valid());
        s.week_id = "week-1".into();
        assert!(!s.is_valid());
        s.admit_files(vec![tf("a.jpg", 1, 1)], 10);
        assert!(s.is_valid());
        // 카탈로그에 없는 주차 id는 유효하지 않다.
        s.week_id = "week-999".into();
        assert!(!s.is_valid());
    }

    #[test]
    fn test_begin_upload_requires_valid_idle_form() {
        let mut flow = SubmitFlow::default();
        // 빈 폼으로는 상태가 바뀌지 않는다.
        assert!(!flow.begin_upload());
        assert_eq!(flow.status, SubmitStatus::Idle);

        flow.submission.name = "홍길동".into();
        flow.submission.week_id = "week-1".into();
        flow.submission.admit_files(vec![tf("a.jpg", 1, 1)], 10);
        assert!(flow.begin_upload());
        assert_eq!(flow.status, SubmitStatus::Uploading);

        // Uploading 중에는 다시 시작할 수 없다.
        assert!(!flow.begin_upload());
    }

    #[test]
    fn test_terminal_transitions_only_from_uploading() {
        let mut flow = SubmitFlow::default();
        let fb = Feedback {
            message: "a.jpg".into(),
            encouragement: "수고하셨습니다!".into(),
        };
        // Idle에서 온 완료 이벤트는 무시한다.
        flow.finish_success(fb.clone());
        assert_eq!(flow.status, SubmitStatus::Idle);

        flow.submission.name = "홍길동".into();
        flow.submission.week_id = "week-1".into();
        flow.submission.admit_files(vec![tf("a.jpg", 1, 1)], 10);
        flow.begin_upload();
        flow.finish_success(fb.clone());
        assert_eq!(flow.status, SubmitStatus::Success(fb));
        // 성공 시 진행률은 정확히 100이 된다.
        assert_eq!(flow.pct, 100);

        // 이미 끝난 시도에 실패가 덮어쓰지 못한다.
        flow.finish_error("late".into());
        assert!(matches!(flow.status, SubmitStatus::Success(_)));
    }

    #[test]
    fn test_full_reset_clears_everything() {
        let mut flow = SubmitFlow::default();
        flow.submission.name = "홍길동".into();
        flow.submission.week_id = "week-1".into();
        flow.submission.admit_files(vec![tf("a.jpg", 1, 1)], 10);
        flow.begin_upload();
        flow.finish_error("boom".into());

        flow.reset_full();
        assert!(flow.submission.name.is_empty());
        assert!(flow.submission.week_id.is_empty());
        assert!(flow.submission.files.is_empty());
        assert_eq!(flow.status, SubmitStatus::Idle);
        assert_eq!(flow.pct, 0);
    }

    #[test]
    fn test_continue_reset_keeps_name_and_week() {
        let mut flow = SubmitFlow::default();
        flow.submission.name = "홍길동".into();
        flow.submission.week_id = "week-1".into();
        flow.submission.admit_files(vec![tf("a.jpg", 1, 1)], 10);
        flow.begin_upload();
        flow.finish_success(Feedback {
            message: "a.jpg".into(),
            encouragement: "수고하셨습니다!".into(),
        });

        flow.reset_continue();
        assert_eq!(flow.submission.name, "홍길동");
        assert_eq!(flow.submission.week_id, "week-1");
        assert!(flow.submission.files.is_empty());
        assert_eq!(flow.status, SubmitStatus::Idle);
        assert_eq!(flow.pct, 0);

        // 초기화 후에는 파일만 다시 붙이면 재제출이 가능하다.
        flow.submission.admit_files(vec![tf("b.pdf", 1, 1)], 10);
        assert!(flow.begin_upload());
    }

    #[test]
    fn test_summarize_files() {
        assert_eq!(summarize_files(&[]), "");
        assert_eq!(summarize_files(&[tf("a.jpg", 1, 1)]), "a.jpg");
        assert_eq!(
            summarize_files(&[tf("a.jpg", 1, 1), tf("b.pdf", 2, 2), tf("c.png", 3, 3)]),
            "a.jpg 외 2건"
        );
    }
}
