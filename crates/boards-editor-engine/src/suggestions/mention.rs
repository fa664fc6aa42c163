use std::sync::Arc;

use async_trait::async_trait;

use crate::collaborators::{
    BoardContext, BoardType, DisplayNameFormatter, Member, MemberDirectory, NameDisplay,
    Permission, PermissionChecker, SearchError, StandardNameFormatter,
};
use crate::suggestions::{
    Candidate, DEFAULT_MEMBER_LIMIT, SuggestionKind, SuggestionSettings, SuggestionSource,
};

/// People search behind the `@` popover
///
/// Users who could add anyone to the board (not a guest, and either allowed to
/// manage board roles or on an open board) search the whole team through the
/// [`MemberDirectory`]. Everyone else only sees the board's own members,
/// filtered locally by display name.
pub struct MentionSource {
    board: BoardContext,
    permissions: Arc<dyn PermissionChecker>,
    directory: Arc<dyn MemberDirectory>,
    formatter: Arc<dyn DisplayNameFormatter>,
    name_display: NameDisplay,
    local_limit: usize,
}

impl MentionSource {
    pub fn new(
        board: BoardContext,
        permissions: Arc<dyn PermissionChecker>,
        directory: Arc<dyn MemberDirectory>,
    ) -> Self {
        Self {
            board,
            permissions,
            directory,
            formatter: Arc::new(StandardNameFormatter),
            name_display: NameDisplay::default(),
            local_limit: DEFAULT_MEMBER_LIMIT,
        }
    }

    pub fn with_formatter(mut self, formatter: Arc<dyn DisplayNameFormatter>) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn with_name_display(mut self, name_display: NameDisplay) -> Self {
        self.name_display = name_display;
        self
    }

    pub fn with_local_limit(mut self, limit: usize) -> Self {
        self.local_limit = limit;
        self
    }

    /// Name display and local result cap from `settings`
    pub fn with_settings(self, settings: &SuggestionSettings) -> Self {
        self.with_name_display(settings.name_display)
            .with_local_limit(settings.member_limit)
    }

    /// Whether searches go to the team directory rather than the board member list
    pub fn uses_remote_search(&self) -> bool {
        !self.board.current_user_is_guest
            && (self.permissions.has_permission(Permission::ManageBoardRoles)
                || self.board.board_type == BoardType::Open)
    }

    fn display_name(&self, member: &Member) -> String {
        let display = self.name_display;
        self.formatter.format_display_name(member, display)
    }

    /// Case-insensitive display name match; `term` is already lowercase
    fn name_matches(&self, member: &Member, term: &str) -> bool {
        term.is_empty() || self.display_name(member).to_lowercase().contains(term)
    }

    fn local_matches(&self, term: &str) -> Vec<Member> {
        let term = term.to_lowercase();
        self.board
            .members
            .iter()
            .filter(|member| self.name_matches(member, &term))
            .take(self.local_limit)
            .cloned()
            .collect()
    }

    fn candidate(&self, member: &Member) -> Candidate {
        Candidate {
            id: member.id.clone(),
            display_name: self.display_name(member),
            avatar_ref: member.avatar_ref.clone(),
            value: member.username.clone(),
            kind: SuggestionKind::Mention,
            is_bot: member.is_bot,
            is_guest: member.is_guest,
            is_board_member: self.board.is_member(&member.id),
        }
    }
}

#[async_trait]
impl SuggestionSource for MentionSource {
    async fn search(&self, term: &str) -> Result<Vec<Candidate>, SearchError> {
        let members = if self.uses_remote_search() {
            self.directory.search_members(term).await?
        } else {
            self.local_matches(term)
        };
        Ok(members.iter().map(|member| self.candidate(member)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::Mutex;

    struct Grants(bool);

    impl PermissionChecker for Grants {
        fn has_permission(&self, _permission: Permission) -> bool {
            self.0
        }
    }

    /// Records every remote search term and returns a fixed team list
    #[derive(Default)]
    struct TeamDirectory {
        searches: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl MemberDirectory for TeamDirectory {
        async fn search_members(&self, term: &str) -> Result<Vec<Member>, SearchError> {
            self.searches.lock().unwrap().push(term.to_string());
            Ok(vec![Member::new("u1", "ada"), Member::new("u9", "outsider")])
        }
    }

    fn board(board_type: BoardType, guest: bool, members: usize) -> BoardContext {
        BoardContext {
            board_type,
            current_user_is_guest: guest,
            members: (0..members)
                .map(|i| Member::new(format!("u{i}"), format!("user{i}")))
                .collect(),
        }
    }

    fn source(board: BoardContext, can_manage: bool) -> (MentionSource, Arc<TeamDirectory>) {
        let directory = Arc::new(TeamDirectory::default());
        let source = MentionSource::new(board, Arc::new(Grants(can_manage)), directory.clone());
        (source, directory)
    }

    #[rstest]
    #[case(BoardType::Open, false, false, true)]
    #[case(BoardType::Private, false, true, true)]
    #[case(BoardType::Private, false, false, false)]
    #[case(BoardType::Open, true, true, false)]
    #[case(BoardType::Private, true, false, false)]
    fn test_search_strategy(
        #[case] board_type: BoardType,
        #[case] guest: bool,
        #[case] can_manage: bool,
        #[case] remote: bool,
    ) {
        let (source, _) = source(board(board_type, guest, 0), can_manage);

        assert_eq!(source.uses_remote_search(), remote);
    }

    #[tokio::test]
    async fn test_remote_search_marks_board_membership() {
        let (source, directory) = source(board(BoardType::Open, false, 2), false);

        let candidates = source.search("a").await.unwrap();

        assert_eq!(directory.searches.lock().unwrap().as_slice(), ["a"]);
        let membership: Vec<(&str, bool)> = candidates
            .iter()
            .map(|c| (c.value.as_str(), c.is_board_member))
            .collect();
        assert_eq!(membership, vec![("ada", true), ("outsider", false)]);
    }

    #[tokio::test]
    async fn test_local_search_is_capped_and_never_remote() {
        let (source, directory) = source(board(BoardType::Private, false, 15), false);

        let candidates = source.search("").await.unwrap();

        assert_eq!(candidates.len(), 10);
        assert!(candidates.iter().all(|c| c.is_board_member));
        assert!(directory.searches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_local_search_matches_display_name_substring() {
        let mut context = board(BoardType::Private, true, 0);
        context.members = vec![
            Member {
                first_name: "Grace".into(),
                last_name: "Hopper".into(),
                ..Member::new("g", "ghopper")
            },
            Member {
                first_name: "Alan".into(),
                last_name: "Turing".into(),
                ..Member::new("t", "aturing")
            },
        ];
        let (source, _) = source(context, true);
        let source = source.with_name_display(NameDisplay::FullName);

        let candidates = source.search("HOP").await.unwrap();

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].display_name, "Grace Hopper");
        assert_eq!(candidates[0].insertion(), "@ghopper ");
    }

    #[tokio::test]
    async fn test_settings_cap_local_results_and_pick_names() {
        let mut context = board(BoardType::Private, false, 5);
        for member in &mut context.members {
            member.first_name = "Sam".into();
        }
        let settings = SuggestionSettings {
            member_limit: 3,
            name_display: NameDisplay::FullName,
            ..SuggestionSettings::default()
        };
        let (source, _) = source(context, false);
        let source = source.with_settings(&settings);

        let candidates = source.search("sam").await.unwrap();

        assert_eq!(candidates.len(), 3);
        assert_eq!(candidates[0].display_name, "Sam");
    }
}
